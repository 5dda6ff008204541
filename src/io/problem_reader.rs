use super::condition_parser;
use crate::{
    model::{Cardinality, Problem, SlotDefinition},
    rules::Hardness,
};
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::io::{BufRead, BufReader, Read};

/// The type of callback functions to call when warnings are raised while reading a problem.
///
/// The arguments are the line number (starting at 1) and the warning message.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

const NAME: &str = r"[_[:alpha:]][-_[:alnum:]]*";

lazy_static! {
    static ref TYPE_LINE_PATTERN: Regex =
        Regex::new(&format!(r"^type\s+({})(\s+exclusive)?$", NAME)).unwrap();
    static ref COMPONENT_LINE_PATTERN: Regex =
        Regex::new(&format!(r"^component\s+({})\s+({})$", NAME, NAME)).unwrap();
    static ref GROUP_LINE_PATTERN: Regex =
        Regex::new(&format!(r"^group\s+({})((?:\s+{})*)$", NAME, NAME)).unwrap();
    static ref ASSIGNMENT_LINE_PATTERN: Regex =
        Regex::new(&format!(r"^assignment\s+({})(?:\s+optional\s+(\d+))?$", NAME)).unwrap();
    static ref SLOT_LINE_PATTERN: Regex = Regex::new(&format!(
        r"^slot\s+({})\s+({})\s+({})\s+(\d+|\+|\*)(\s+optional)?$",
        NAME, NAME, NAME
    ))
    .unwrap();
    static ref FIXED_LINE_PATTERN: Regex = Regex::new(&format!(
        r"^fixed\s+({})\s+({})\s+({})((?:\s+{})*)$",
        NAME, NAME, NAME, NAME
    ))
    .unwrap();
    static ref RULE_LINE_PATTERN: Regex =
        Regex::new(&format!(r"^rule\s+({})\s+(?:(hard)|soft\s+(\d+))\s+(\(.*)$", NAME)).unwrap();
    static ref FOR_CLAUSE_PATTERN: Regex = Regex::new(r"^\s+for\s+(.*)$").unwrap();
}

fn words(captures: &Captures, i: usize) -> Vec<String> {
    captures
        .get(i)
        .map(|m| m.as_str().split_whitespace().map(|w| w.to_string()).collect())
        .unwrap_or_default()
}

fn parse_number(captures: &Captures, i: usize) -> Result<Option<usize>> {
    captures
        .get(i)
        .map(|m| {
            m.as_str()
                .parse::<usize>()
                .with_context(|| format!(r#"invalid number "{}""#, m.as_str()))
        })
        .transpose()
}

fn parse_tuples(s: &str) -> Result<Vec<Vec<String>>> {
    s.split('|')
        .map(|t| {
            let tuple = t.split_whitespace().map(|w| w.to_string()).collect::<Vec<String>>();
            if tuple.is_empty() {
                Err(anyhow!("empty tuple in rule scope"))
            } else {
                Ok(tuple)
            }
        })
        .collect()
}

/// A reader for problem descriptions.
///
/// # Format
///
/// Problems are described line by line, one declaration per line.
/// Empty lines and lines beginning with `#` are ignored.
/// Everything a line refers to must be declared in a previous line.
///
/// ```text
/// type <Type> [exclusive]
/// component <Component> <Type>
/// group <Group> <Component>...
/// assignment <Assignment> [optional <weight>]
/// slot <Assignment> <slot> <Type> <n|+|*> [optional]
/// fixed <Assignment> <slot> <Type> <Component>...
/// rule <label> hard <condition> [for <A> <B> | <C> <D>]
/// rule <label> soft <weight> <condition> [for ...]
/// ```
///
/// Conditions are written as s-expressions, see [`parse_condition`](super::parse_condition).
/// A `for` clause restricts a rule to the listed tuples of assignments.
///
/// # Example
///
/// ```
/// # use schedsat::io::ProblemReader;
/// let instance = r#"
/// type Room
/// component R1 Room
/// component R2 Room
/// assignment M1
/// slot M1 room Room 1
/// rule in_r1 hard (component-is 0.room R1)
/// "#;
/// let problem = ProblemReader::default().read(&mut instance.as_bytes()).unwrap();
/// assert_eq!(2, problem.components().len());
/// ```
#[derive(Default)]
pub struct ProblemReader {
    warning_handlers: Vec<WarningHandler>,
}

impl ProblemReader {
    /// Reads a [`Problem`].
    ///
    /// In case warnings are raised, the callback functions registered by [add_warning_handler](Self::add_warning_handler) are triggered.
    pub fn read(&self, reader: &mut dyn Read) -> Result<Problem> {
        let mut problem = Problem::default();
        let br = BufReader::new(reader);
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line {}", i + 1);
            let warn = |w: String| self.warning_handlers.iter().for_each(|h| (h)(i + 1, w.clone()));
            let line = line.with_context(context)?;
            let l = line.trim();
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            self.read_line(&mut problem, l, &warn).with_context(context)?;
        }
        Ok(problem)
    }

    fn read_line(&self, problem: &mut Problem, l: &str, warn: &dyn Fn(String)) -> Result<()> {
        if let Some(c) = TYPE_LINE_PATTERN.captures(l) {
            problem.new_component_type(&c[1])?;
            if c.get(2).is_some() {
                problem.set_exclusive(&c[1], true)?;
            }
        } else if let Some(c) = COMPONENT_LINE_PATTERN.captures(l) {
            problem.new_component(&c[1], &c[2])?;
        } else if let Some(c) = GROUP_LINE_PATTERN.captures(l) {
            if problem.groups().id_of(&c[1]).is_err() {
                problem.new_group(&c[1])?;
            }
            let members = words(&c, 2);
            if members.is_empty() {
                warn(format!(r#"group "{}" declared without component"#, &c[1]));
            }
            for m in members {
                problem.add_to_group(&m, &c[1])?;
            }
        } else if let Some(c) = ASSIGNMENT_LINE_PATTERN.captures(l) {
            problem.new_assignment(&c[1])?;
            if let Some(weight) = parse_number(&c, 2)? {
                if weight == 0 {
                    warn(format!(r#"optional assignment "{}" has a null weight"#, &c[1]));
                }
                problem.set_optional(&c[1], weight)?;
            }
        } else if let Some(c) = SLOT_LINE_PATTERN.captures(l) {
            let mut definition =
                SlotDefinition::variable(&c[3], Cardinality::try_from(&c[4])?);
            if c.get(5).is_some() {
                definition = definition.optional();
            }
            problem.add_slot(&c[1], &c[2], definition)?;
        } else if let Some(c) = FIXED_LINE_PATTERN.captures(l) {
            let components = words(&c, 4);
            let components = components.iter().map(|s| s.as_str()).collect::<Vec<&str>>();
            let mut definition = SlotDefinition::fixed(&c[3], &components);
            if components.is_empty() {
                warn(format!(r#"fixed slot "{}" of "{}" is empty"#, &c[2], &c[1]));
                definition = definition.optional();
            }
            problem.add_slot(&c[1], &c[2], definition)?;
        } else if let Some(c) = RULE_LINE_PATTERN.captures(l) {
            self.read_rule(problem, &c, warn)?;
        } else {
            return Err(anyhow!(r#"syntax error in line "{}""#, l));
        }
        Ok(())
    }

    fn read_rule(&self, problem: &mut Problem, c: &Captures, warn: &dyn Fn(String)) -> Result<()> {
        let label = &c[1];
        let hardness = match parse_number(c, 3)? {
            Some(weight) => {
                if weight == 0 {
                    warn(format!(r#"soft rule "{}" has a null weight"#, label));
                }
                Hardness::Soft(weight)
            }
            None => Hardness::Hard,
        };
        let (condition, rest) = condition_parser::parse_condition_prefix(&c[4])
            .with_context(|| format!(r#"while reading the condition of rule "{}""#, label))?;
        if rest.trim().is_empty() {
            problem.new_rule(label, condition, hardness)?;
            return Ok(());
        }
        let tuples = match FOR_CLAUSE_PATTERN.captures(rest) {
            Some(f) => parse_tuples(&f[1])?,
            None => return Err(anyhow!(r#"unexpected text "{}" after condition"#, rest.trim())),
        };
        let tuple_refs = tuples
            .iter()
            .map(|t| t.iter().map(|s| s.as_str()).collect::<Vec<&str>>())
            .collect::<Vec<Vec<&str>>>();
        let tuple_slices = tuple_refs.iter().map(|t| t.as_slice()).collect::<Vec<&[&str]>>();
        problem.new_restricted_rule(label, condition, hardness, &tuple_slices)?;
        Ok(())
    }

    /// Adds a callback function to call when warnings are raised while reading a problem.
    pub fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }
}

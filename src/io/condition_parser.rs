use crate::conditions::{ComponentSet, Condition, ConditionType, SlotRef};
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::{str::FromStr, sync::Arc};

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\(|\)|[^\s()]+").unwrap();
}

#[derive(Debug, PartialEq, Eq)]
enum SExpr<'a> {
    Atom(&'a str),
    List(Vec<SExpr<'a>>),
}

impl SExpr<'_> {
    fn atom(&self) -> Result<&str> {
        match self {
            SExpr::Atom(a) => Ok(*a),
            SExpr::List(_) => Err(anyhow!("expected a word, found a list")),
        }
    }

    fn list(&self) -> Result<&[SExpr]> {
        match self {
            SExpr::List(l) => Ok(l.as_slice()),
            SExpr::Atom(a) => Err(anyhow!(r#"expected a list, found "{}""#, a)),
        }
    }
}

/// Parses a condition written as an s-expression, as printed by the [`Display`](std::fmt::Display)
/// implementation of [`Condition`].
///
/// ```
/// # use schedsat::io::parse_condition;
/// let c = parse_condition("(max-assignments 2 (component-is 0.host E1))").unwrap();
/// assert_eq!("(max-assignments 2 (component-is 0.host E1))", c.to_string());
/// ```
pub fn parse_condition(s: &str) -> Result<Arc<Condition>> {
    let (condition, rest) = parse_condition_prefix(s)?;
    if !rest.trim().is_empty() {
        return Err(anyhow!(r#"unexpected text "{}" after condition"#, rest.trim()));
    }
    Ok(condition)
}

/// Parses the condition at the beginning of a string, and returns the remaining text.
pub(crate) fn parse_condition_prefix(s: &str) -> Result<(Arc<Condition>, &str)> {
    let (expr, end) = read_sexpr(s)?;
    let condition = to_condition(&expr).with_context(|| format!(r#"while parsing "{}""#, &s[..end]))?;
    Ok((condition, &s[end..]))
}

fn read_sexpr(s: &str) -> Result<(SExpr, usize)> {
    let mut stack: Vec<Vec<SExpr>> = Vec::new();
    for m in TOKEN_PATTERN.find_iter(s) {
        match m.as_str() {
            "(" => stack.push(Vec::new()),
            ")" => {
                let list = stack
                    .pop()
                    .ok_or_else(|| anyhow!("unbalanced closing parenthesis"))?;
                match stack.last_mut() {
                    Some(parent) => parent.push(SExpr::List(list)),
                    None => return Ok((SExpr::List(list), m.end())),
                }
            }
            atom => match stack.last_mut() {
                Some(parent) => parent.push(SExpr::Atom(atom)),
                None => return Err(anyhow!(r#"expected a condition, found "{}""#, atom)),
            },
        }
    }
    Err(anyhow!("unexpected end of condition"))
}

fn to_condition(expr: &SExpr) -> Result<Arc<Condition>> {
    let list = expr.list()?;
    let (head, args) = list
        .split_first()
        .ok_or_else(|| anyhow!("empty condition"))?;
    let keyword = head.atom()?;
    let condition_type = ConditionType::from_str(keyword)
        .map_err(|_| anyhow!(r#"unknown condition "{}""#, keyword))?;
    let check_n_args = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(anyhow!(
                "{} expects {} argument(s), got {}",
                keyword,
                n,
                args.len()
            ))
        }
    };
    let children = || args.iter().map(to_condition).collect::<Result<Vec<_>>>();
    let slot = |e: &SExpr| -> Result<SlotRef> { Ok(SlotRef::try_from(e.atom()?)?) };
    let bound = |e: &SExpr| -> Result<usize> {
        let a = e.atom()?;
        a.parse::<usize>()
            .map_err(|_| anyhow!(r#""{}" is not a valid bound"#, a))
    };
    Ok(match condition_type {
        ConditionType::Not => {
            check_n_args(1)?;
            Condition::not(to_condition(&args[0])?)
        }
        ConditionType::And => Condition::and(children()?),
        ConditionType::Or => Condition::or(children()?),
        ConditionType::Xor | ConditionType::Implies | ConditionType::Iff => {
            check_n_args(2)?;
            let c1 = to_condition(&args[0])?;
            let c2 = to_condition(&args[1])?;
            match condition_type {
                ConditionType::Xor => Condition::xor(c1, c2),
                ConditionType::Implies => Condition::implies(c1, c2),
                _ => Condition::iff(c1, c2),
            }
        }
        ConditionType::ComponentIs => {
            check_n_args(2)?;
            Condition::component_is(slot(&args[0])?, args[1].atom()?)
        }
        ConditionType::ComponentIn => {
            check_n_args(2)?;
            Condition::component_in(slot(&args[0])?, to_component_set(&args[1])?)
        }
        ConditionType::SameComponent => {
            check_n_args(2)?;
            Condition::same_component(slot(&args[0])?, slot(&args[1])?)
        }
        ConditionType::Distinct => {
            Condition::distinct(args.iter().map(slot).collect::<Result<Vec<SlotRef>>>()?)
        }
        ConditionType::InGroup => {
            check_n_args(2)?;
            Condition::in_group(slot(&args[0])?, args[1].atom()?)
        }
        ConditionType::MaxAssignments
        | ConditionType::MinAssignments
        | ConditionType::MaxInSequence => {
            check_n_args(2)?;
            let k = bound(&args[0])?;
            let sub = to_condition(&args[1])?;
            match condition_type {
                ConditionType::MaxAssignments => Condition::max_assignments(sub, k),
                ConditionType::MinAssignments => Condition::min_assignments(sub, k),
                _ => Condition::max_in_sequence(sub, k),
            }
        }
    })
}

fn to_component_set(expr: &SExpr) -> Result<ComponentSet> {
    let list = expr.list()?;
    let words = list.iter().map(|e| e.atom()).collect::<Result<Vec<&str>>>()?;
    match words.as_slice() {
        ["type", t] => Ok(ComponentSet::Type(t.to_string())),
        ["group", g] => Ok(ComponentSet::Group(g.to_string())),
        ["components", components @ ..] => Ok(ComponentSet::Components(
            components.iter().map(|c| c.to_string()).collect(),
        )),
        _ => Err(anyhow!(
            "a component set must be (type <type>), (group <group>) or (components <component>...)"
        )),
    }
}

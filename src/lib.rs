//! Schedsat compiles component-to-slot scheduling problems into SAT and solves them.
//!
//! A [`Problem`](model::Problem) declares typed components, assignments made of slots, and rules
//! (logical conditions over the slots of tuples of assignments).
//! A [`ScheduleSolver`](solvers::ScheduleSolver) compiles it and returns a model, all the models,
//! or an explanation of why there is none.

#![warn(missing_docs)]

pub mod conditions;

pub mod encodings;

pub mod error;

pub mod instantiation;

pub mod io;

pub mod model;

pub mod rules;

pub mod sat;

pub mod solvers;

//! Charset validation for the names the engine accepts.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Task-type names start with an alphabetic character followed by word
/// characters.
static TASK_TYPE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]\w*$").unwrap());

/// Queue, whitelist and instance names allow word characters plus `@+-`.
static GENERAL_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w@+-]+$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error(
        "'{0}' must start with an alphabetic character [a-zA-Z] \
         followed by word characters [a-zA-Z0-9_]"
    )]
    InvalidTaskTypeName(String),
    #[error("'{0}' may contain @/+/-/_ and word characters only")]
    InvalidName(String),
}

pub fn validate_task_type_name(name: &str) -> Result<(), NameError> {
    if TASK_TYPE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(NameError::InvalidTaskTypeName(name.to_string()))
    }
}

pub fn validate_queue_name(name: &str) -> Result<(), NameError> {
    validate_general_name(name)
}

pub fn validate_whitelist_name(name: &str) -> Result<(), NameError> {
    validate_general_name(name)
}

pub fn validate_instance_name(name: &str) -> Result<(), NameError> {
    validate_general_name(name)
}

fn validate_general_name(name: &str) -> Result<(), NameError> {
    if GENERAL_NAME.is_match(name) {
        Ok(())
    } else {
        Err(NameError::InvalidName(name.to_string()))
    }
}

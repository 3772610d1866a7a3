//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used throughout the `querylab` workspace.
//! It is divided into sub-modules based on the task the prompt drives.

pub mod misspell;
pub mod table_qa;

//! String and date formatting shared by the front ends.

pub mod format;

pub use format::{
    contains_ignore_case, format_currency, format_date, format_relative_date, is_valid_email,
    slugify, truncate_text,
};

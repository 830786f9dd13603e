//! The standard set of expense categories.
//!
//! The `category` column is free text, so any string is accepted by the ledger.
//! These are the categories the household forms offer by default.

use crate::errors::{Error, Result};
use std::{fmt, str::FromStr};

/// A built-in expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    /// Rent, mortgage, utilities
    Housing,
    /// Groceries and eating out
    Food,
    /// Fuel, fares, car costs
    Transportation,
    /// Leisure and hobbies
    Entertainment,
    /// School, childcare, kids' things
    ChildRelated,
    /// Doctors and pharmacy
    Medical,
    /// Savings and investments
    Investment,
    /// Everything else
    Miscellaneous,
}

impl ExpenseCategory {
    /// All categories in the order forms list them.
    pub const ALL: [Self; 8] = [
        Self::Housing,
        Self::Food,
        Self::Transportation,
        Self::Entertainment,
        Self::ChildRelated,
        Self::Medical,
        Self::Investment,
        Self::Miscellaneous,
    ];

    /// The stored form of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::ChildRelated => "Child-Related",
            Self::Medical => "Medical",
            Self::Investment => "Investment",
            Self::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = Error;

    /// Case-insensitive; `child related` and `childrelated` are accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|category| {
                let name: String = category
                    .as_str()
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect();
                name.to_lowercase() == wanted
            })
            .ok_or_else(|| Error::Validation {
                message: format!("Unknown expense category: {s}"),
            })
    }
}

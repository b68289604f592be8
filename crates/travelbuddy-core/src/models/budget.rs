use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub budget: f64,
    /// Running total of the expenses that name this category.
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub icon: String,
}

impl Category {
    fn new(id: i64, name: &str, budget: f64, icon: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            budget,
            spent: 0.0,
            icon: icon.to_string(),
        }
    }

    /// Budget left, never below zero.
    pub fn remaining(&self) -> f64 {
        (self.budget - self.spent).max(0.0)
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget
    }

    pub fn percent_used(&self) -> f64 {
        if self.budget > 0.0 {
            self.spent * 100.0 / self.budget
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    /// Name of the category this expense counts against.
    pub category: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Budget {
    #[serde(default)]
    pub id: i64,
    pub trip_id: i64,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub budget: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: Option<NaiveDate>,
}

/// Budget export document with its totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub categories: Vec<Category>,
    pub expenses: Vec<Expense>,
    pub summary: BudgetTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTotals {
    pub total_budget: f64,
    pub total_spent: f64,
    pub export_date: DateTime<Utc>,
}

impl Budget {
    /// An unsaved budget for `trip_id` seeded with the default categories.
    pub fn new(trip_id: i64) -> Self {
        Self {
            id: 0,
            trip_id,
            categories: Self::default_categories(),
            expenses: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn default_categories() -> Vec<Category> {
        vec![
            Category::new(1, "Transportation", 500.0, "fas fa-plane"),
            Category::new(2, "Accommodation", 800.0, "fas fa-bed"),
            Category::new(3, "Food & Dining", 400.0, "fas fa-utensils"),
            Category::new(4, "Activities", 300.0, "fas fa-ticket-alt"),
        ]
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    fn next_category_id(&self) -> i64 {
        self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    fn next_expense_id(&self) -> i64 {
        self.expenses.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    pub fn add_category(&mut self, new: NewCategory) -> Result<&Category, ValidationError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Category name"));
        }
        if !new.budget.is_finite() || new.budget < 0.0 {
            return Err(ValidationError::NegativeBudget);
        }
        if self.category(name).is_some() {
            return Err(ValidationError::DuplicateCategory(name.to_string()));
        }

        let category = Category::new(self.next_category_id(), name, new.budget, &new.icon);
        self.categories.push(category);
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Record an expense and add it to its category's `spent`.
    pub fn add_expense(&mut self, new: NewExpense) -> Result<&Expense, ValidationError> {
        let description = new.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingField("Description"));
        }
        let category = new.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingField("Category"));
        }
        let date = new.date.ok_or(ValidationError::MissingField("Date"))?;
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.category(category).is_none() {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }

        let id = self.next_expense_id();
        self.expenses.push(Expense {
            id,
            description: description.to_string(),
            amount: new.amount,
            category: category.to_string(),
            date,
        });
        self.recompute_spent(category);
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Remove the expense at `index` and take it back out of its category.
    pub fn delete_expense(&mut self, index: usize) -> Option<Expense> {
        if index >= self.expenses.len() {
            return None;
        }
        let expense = self.expenses.remove(index);
        self.recompute_spent(&expense.category);
        Some(expense)
    }

    /// `spent` is the sum of the category's expenses, never a running tally.
    fn recompute_spent(&mut self, name: &str) {
        let total = self
            .expenses
            .iter()
            .filter(|e| e.category == name)
            .fold(0.0, |total, e| total + e.amount);
        if let Some(category) = self.categories.iter_mut().find(|c| c.name == name) {
            category.spent = total;
        }
    }

    /// Remove a category together with every expense filed under it.
    pub fn delete_category(&mut self, id: i64) -> Option<Category> {
        let index = self.categories.iter().position(|c| c.id == id)?;
        let category = self.categories.remove(index);
        self.expenses.retain(|e| e.category != category.name);
        Some(category)
    }

    pub fn total_budget(&self) -> f64 {
        self.categories.iter().map(|c| c.budget).sum()
    }

    pub fn total_spent(&self) -> f64 {
        self.categories.iter().map(|c| c.spent).sum()
    }

    /// Sum of every recorded expense, whatever its category.
    pub fn expense_total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// May go negative when over budget.
    pub fn remaining(&self) -> f64 {
        self.total_budget() - self.total_spent()
    }

    pub fn percent_used(&self) -> f64 {
        let total = self.total_budget();
        if total > 0.0 {
            self.total_spent() * 100.0 / total
        } else {
            0.0
        }
    }

    pub fn summary(&self, now: DateTime<Utc>) -> BudgetSummary {
        BudgetSummary {
            categories: self.categories.clone(),
            expenses: self.expenses.clone(),
            summary: BudgetTotals {
                total_budget: self.total_budget(),
                total_spent: self.total_spent(),
                export_date: now,
            },
        }
    }
}

/// Fields to save a budget with. Budgets are found by `trip_id`; `None`
/// leaves a list untouched on update.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDraft {
    pub trip_id: i64,
    pub categories: Option<Vec<Category>>,
    pub expenses: Option<Vec<Expense>>,
}

impl BudgetDraft {
    pub fn from_budget(budget: &Budget) -> Self {
        Self {
            trip_id: budget.trip_id,
            categories: Some(budget.categories.clone()),
            expenses: Some(budget.expenses.clone()),
        }
    }

    pub(crate) fn apply_to(self, budget: &mut Budget, now: DateTime<Utc>) {
        if let Some(categories) = self.categories {
            budget.categories = categories;
        }
        if let Some(expenses) = self.expenses {
            budget.expenses = expenses;
        }
        budget.updated_at = Some(now);
    }

    pub(crate) fn into_budget(self, id: i64, now: DateTime<Utc>) -> Budget {
        Budget {
            id,
            trip_id: self.trip_id,
            categories: self.categories.unwrap_or_default(),
            expenses: self.expenses.unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

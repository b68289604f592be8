use tracing::{debug, info};

use super::{keys, TravelBuddy};
use crate::error::ValidationError;
use crate::models::{
    Budget, BudgetDraft, BudgetSummary, Category, Expense, IntoId, NewCategory, NewExpense,
};
use crate::storage::Records;

impl TravelBuddy {
    pub fn get_budgets(&self) -> Vec<Budget> {
        self.store.get_records::<Budget>(keys::BUDGETS).items
    }

    pub fn get_budget(&self, trip_id: impl IntoId) -> Option<Budget> {
        let trip_id = trip_id.into_id()?;
        self.get_budgets().into_iter().find(|b| b.trip_id == trip_id)
    }

    /// Find-or-insert by trip id. Returns whether the write succeeded.
    pub fn save_budget(&self, draft: BudgetDraft) -> bool {
        let mut records: Records<Budget> = self.store.get_records(keys::BUDGETS);
        let budgets = &mut records.items;
        let now = self.clock.now();

        match budgets.iter().position(|b| b.trip_id == draft.trip_id) {
            Some(index) => {
                draft.apply_to(&mut budgets[index], now);
                debug!(trip_id = budgets[index].trip_id, "Budget updated");
            }
            None => {
                let budget = draft.into_budget(self.next_id(), now);
                info!(trip_id = budget.trip_id, id = budget.id, "Budget created");
                budgets.push(budget);
            }
        }

        self.store.set_records(keys::BUDGETS, &records)
    }

    /// A working budget with the default categories and no trip selected.
    pub fn budget_session(&self) -> BudgetSession<'_> {
        BudgetSession {
            core: self,
            trip_id: None,
            budget: Budget::new(0),
        }
    }
}

/// The budget page's working state.
///
/// Edits always apply to the in-memory budget. They are persisted through
/// `save_budget` only while a trip is selected.
pub struct BudgetSession<'a> {
    core: &'a TravelBuddy,
    trip_id: Option<i64>,
    budget: Budget,
}

impl<'a> BudgetSession<'a> {
    pub fn trip_id(&self) -> Option<i64> {
        self.trip_id
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Load the trip's stored budget, or start one from the current
    /// categories with nothing spent.
    pub fn select_trip(&mut self, trip_id: impl IntoId) -> bool {
        let Some(trip_id) = trip_id.into_id() else {
            return false;
        };
        self.trip_id = Some(trip_id);
        self.budget = match self.core.get_budget(trip_id) {
            Some(stored) => stored,
            None => {
                let categories = self
                    .budget
                    .categories
                    .iter()
                    .map(|c| Category {
                        spent: 0.0,
                        ..c.clone()
                    })
                    .collect();
                Budget {
                    categories,
                    ..Budget::new(trip_id)
                }
            }
        };
        true
    }

    /// Back to the defaults with no trip selected.
    pub fn new_budget(&mut self) {
        self.trip_id = None;
        self.budget = Budget::new(0);
    }

    pub fn add_category(&mut self, new: NewCategory) -> Result<Category, ValidationError> {
        let category = self.budget.add_category(new)?.clone();
        self.persist();
        Ok(category)
    }

    pub fn delete_category(&mut self, id: i64) -> Option<Category> {
        let removed = self.budget.delete_category(id)?;
        self.persist();
        Some(removed)
    }

    pub fn add_expense(&mut self, new: NewExpense) -> Result<Expense, ValidationError> {
        let new = NewExpense {
            date: new.date.or_else(|| Some(self.core.today())),
            ..new
        };
        let expense = self.budget.add_expense(new)?.clone();
        self.persist();
        Ok(expense)
    }

    pub fn delete_expense(&mut self, index: usize) -> Option<Expense> {
        let removed = self.budget.delete_expense(index)?;
        self.persist();
        Some(removed)
    }

    pub fn summary(&self) -> BudgetSummary {
        self.budget.summary(self.core.clock.now())
    }

    fn persist(&self) {
        if let Some(trip_id) = self.trip_id {
            self.core.save_budget(BudgetDraft {
                trip_id,
                ..BudgetDraft::from_budget(&self.budget)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::clock::Clock;
    use crate::models::TripDraft;

    fn food(amount: f64) -> NewExpense {
        NewExpense {
            description: "Dinner".to_string(),
            amount,
            category: "Food & Dining".to_string(),
            date: Some(date(2025, 6, 2)),
        }
    }

    #[test]
    fn test_save_budget_find_or_insert() {
        let (core, _) = core();
        assert!(core.save_budget(BudgetDraft::from_budget(&Budget::new(7))));
        let created = core.get_budget(7).unwrap();
        assert!(created.created_at.is_some());
        assert_eq!(created.categories.len(), 4);

        assert!(core.save_budget(BudgetDraft {
            trip_id: 7,
            categories: Some(Vec::new()),
            expenses: None,
        }));
        let updated = core.get_budget("7").unwrap();
        assert_eq!(updated.id, created.id);
        assert!(updated.categories.is_empty());
        assert_eq!(core.get_budgets().len(), 1);
        assert!(core.get_budget(8).is_none());
    }

    #[test]
    fn test_unreadable_budget_is_kept_on_save() {
        let (core, _) = core();
        core.store.set(
            keys::BUDGETS,
            &serde_json::json!([
                {"id": 1, "tripId": 7, "categories": []},
                {"id": 2, "categories": []}
            ]),
        );
        assert_eq!(core.get_budgets().len(), 1);

        assert!(core.save_budget(BudgetDraft::from_budget(&Budget::new(8))));
        assert!(core.get_budget(7).is_some());
        assert!(core.get_budget(8).is_some());

        let raw: Vec<serde_json::Value> = core.store.get(keys::BUDGETS, Vec::new());
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[2], serde_json::json!({"id": 2, "categories": []}));
    }

    #[test]
    fn test_food_expense_scenario() {
        let (core, _) = core();
        let trip = core.save_trip(TripDraft::new("Rome Trip").destination("Rome, Italy"));

        let mut session = core.budget_session();
        assert!(session.select_trip(trip));
        session.add_expense(food(30.0)).unwrap();

        let stored = core.get_budget(trip).unwrap();
        assert_eq!(stored.category("Food & Dining").unwrap().spent, 30.0);
        assert_eq!(stored.expenses.len(), 1);
        assert_eq!(stored.total_spent(), stored.expense_total());
        assert_eq!(core.get_trip_statistics().total_spent, 30.0);
    }

    #[test]
    fn test_unselected_session_does_not_persist() {
        let (core, _) = core();
        let mut session = core.budget_session();
        session.add_expense(food(12.0)).unwrap();

        assert_eq!(session.budget().total_spent(), 12.0);
        assert!(core.get_budgets().is_empty());
    }

    #[test]
    fn test_selecting_new_trip_keeps_categories_without_spend() {
        let (core, _) = core();
        let mut session = core.budget_session();
        session
            .add_category(NewCategory {
                name: "Souvenirs".to_string(),
                budget: 50.0,
                icon: "fas fa-gift".to_string(),
            })
            .unwrap();
        session.add_expense(food(20.0)).unwrap();

        session.select_trip(99);
        let budget = session.budget();
        assert_eq!(budget.trip_id, 99);
        assert_eq!(budget.categories.len(), 5);
        assert!(budget.expenses.is_empty());
        assert_eq!(budget.total_spent(), 0.0);

        session.new_budget();
        assert_eq!(session.trip_id(), None);
        assert_eq!(session.budget().categories, Budget::default_categories());
    }

    #[test]
    fn test_session_edits_persist_for_selected_trip() {
        let (core, clock) = core();
        let mut session = core.budget_session();
        session.select_trip("5");

        let expense = session
            .add_expense(NewExpense {
                date: None,
                ..food(40.0)
            })
            .unwrap();
        assert_eq!(expense.date, clock.now().date_naive());

        session.add_expense(food(10.0)).unwrap();
        session.delete_expense(0).unwrap();
        assert_eq!(core.get_budget(5).unwrap().total_spent(), 10.0);

        let food_id = session.budget().category("Food & Dining").unwrap().id;
        session.delete_category(food_id).unwrap();
        let stored = core.get_budget(5).unwrap();
        assert!(stored.expenses.is_empty());
        assert_eq!(stored.categories.len(), 3);

        assert_eq!(
            session.add_expense(food(0.0)),
            Err(ValidationError::NonPositiveAmount)
        );
        assert_eq!(session.summary().summary.export_date, clock.now());
    }
}

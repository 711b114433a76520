use chrono::Utc;

use super::StoreState;
use backend_domain::{Operator, OperatorAccount, OperatorId, StoreError, StoreResult};

impl StoreState {
    pub fn find_account(&self, username: &str) -> Option<OperatorAccount> {
        let wanted = username.trim().to_lowercase();
        self.operators
            .values()
            .find(|account| account.operator.username == wanted)
            .cloned()
    }

    pub fn get_account(&self, id: OperatorId) -> Option<OperatorAccount> {
        self.operators.get(&id).cloned()
    }

    pub fn create_operator(
        &mut self,
        username: &str,
        display_name: &str,
        counter_name: Option<String>,
        password_hash: String,
    ) -> StoreResult<Operator> {
        let username = username.trim().to_lowercase();
        if self.find_account(&username).is_some() {
            return Err(StoreError::Conflict(format!(
                "operator '{}' already exists",
                username
            )));
        }
        let operator = Operator {
            id: self.next_operator_id(),
            username,
            display_name: display_name.to_string(),
            counter_name,
            created_at: Utc::now(),
        };
        self.operators.insert(
            operator.id,
            OperatorAccount {
                operator: operator.clone(),
                password_hash,
            },
        );
        Ok(operator)
    }

    /// Roster seeding: refreshes name, counter and hash of an existing
    /// username and keeps its id, so issued sessions stay valid.
    pub fn upsert_operator(
        &mut self,
        username: &str,
        display_name: &str,
        counter_name: Option<String>,
        password_hash: String,
    ) -> Operator {
        let wanted = username.trim().to_lowercase();
        if let Some(account) = self
            .operators
            .values_mut()
            .find(|account| account.operator.username == wanted)
        {
            account.operator.display_name = display_name.to_string();
            account.operator.counter_name = counter_name;
            account.password_hash = password_hash;
            return account.operator.clone();
        }
        let operator = Operator {
            id: self.next_operator_id(),
            username: wanted,
            display_name: display_name.to_string(),
            counter_name,
            created_at: Utc::now(),
        };
        self.operators.insert(
            operator.id,
            OperatorAccount {
                operator: operator.clone(),
                password_hash,
            },
        );
        operator
    }

    pub fn list_operators(&self) -> Vec<Operator> {
        self.operators
            .values()
            .map(|account| account.operator.clone())
            .collect()
    }
}

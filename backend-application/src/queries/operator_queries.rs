use crate::{AppError, AppState};
use backend_domain::Operator;

/// Password hashes never leave the store through this path.
pub async fn list_operators(state: &AppState) -> Result<Vec<Operator>, AppError> {
    let operators = state.operator_repo.list_operators().await?;
    Ok(operators)
}

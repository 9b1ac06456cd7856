// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedEmployee;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define as variáveis RLS (usuário e papel) dentro dela,
/// para que as policies do Postgres filtrem as linhas por conta própria.
/// set_config(..., true) é local à transação: a leitura precisa rodar na MESMA
/// transação, senão a variável já reverteu quando a query executa.
pub(crate) async fn get_rls_transaction(
    app_state: &AppState,
    user: &AuthenticatedEmployee,
) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, AppError> {
    // 1. Abre a transação
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;

    // 2. Define User ID
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user.0.id.to_string())
        .execute(&mut *tx)
        .await?;

    // 3. Define o papel (admin ou employee)
    sqlx::query("SELECT set_config('app.role', $1, true)")
        .bind(user.0.role.as_str())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

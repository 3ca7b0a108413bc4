use serde::{Deserialize, Serialize};

/// Login account row. Linked to an employee profile when the account belongs
/// to a staff member (admin/system accounts may have none).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
    pub is_active: bool,
}

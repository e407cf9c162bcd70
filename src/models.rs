pub mod auth;
pub mod expense;
pub mod filters;
pub mod user;

pub use auth::{AuthResponse, LoginRequest};
pub use expense::{
    CreateExpenseRequest, Expense, ExpenseCategory, ExpenseChanges, UpdateExpenseRequest,
};
pub use filters::{CategoryTotal, ExpenseFilters, ExpenseList, ListExpensesQuery, Summary};
pub use user::{CreateUserRequest, NewUser, PublicUser, User};

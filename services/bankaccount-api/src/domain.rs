// ドメイン層モジュール
pub mod bank_account;
pub mod bank_transaction;
pub mod friendship;
pub mod person;
pub mod validation;

// 再エクスポート
pub use bank_account::{BankAccount, CreateBankAccount, UpdateBankAccount};
pub use bank_transaction::{BankTransaction, CreateBankTransaction, UpdateBankTransaction};
pub use friendship::{CreateFriendship, Friendship};
pub use person::{CreatePerson, Person, UpdatePerson};
pub use validation::ValidationError;

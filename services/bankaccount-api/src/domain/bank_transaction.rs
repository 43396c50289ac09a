/// 銀行取引（`BankTransaction`頂点）
///
/// 業務キー`transactionId`で一意に識別される。
/// 送金元口座から`sent_transaction`、相手口座から`received_transaction`の
/// 2本のエッジで取引頂点に接続される。
use serde::{Deserialize, Serialize};

use super::validation::{require_non_blank, validate_amount, ValidationError};

/// グラフ上の頂点ラベル
pub const BANK_TRANSACTION_LABEL: &str = "BankTransaction";

/// 業務キーのプロパティ名
pub const TRANSACTION_ID_PROPERTY: &str = "transactionId";

/// 送金元口座 → 取引
pub const SENT_TRANSACTION_LABEL: &str = "sent_transaction";

/// 相手口座 → 取引
pub const RECEIVED_TRANSACTION_LABEL: &str = "received_transaction";

/// 銀行取引レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    pub transaction_id: String,
    #[serde(rename = "bankAccountIBAN")]
    pub bank_account_iban: String,
    #[serde(rename = "otherPersonIBAN")]
    pub other_person_iban: String,
    pub amount: f64,
}

/// 銀行取引作成ペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBankTransaction {
    #[serde(rename = "bankAccountIBAN")]
    pub bank_account_iban: String,
    #[serde(rename = "otherPersonIBAN")]
    pub other_person_iban: String,
    pub amount: f64,
}

impl CreateBankTransaction {
    /// 金額を最初に検証する（不正な金額では口座の存在確認も行わない）
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_amount(self.amount)?;
        require_non_blank("bankAccountIBAN", &self.bank_account_iban)?;
        require_non_blank("otherPersonIBAN", &self.other_person_iban)
    }

    pub fn into_transaction(self, transaction_id: String) -> BankTransaction {
        BankTransaction {
            transaction_id,
            bank_account_iban: self.bank_account_iban,
            other_person_iban: self.other_person_iban,
            amount: self.amount,
        }
    }
}

/// 銀行取引更新ペイロード
///
/// 更新可能なのは金額のみで、金額は必須。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBankTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl UpdateBankTransaction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let amount = self.amount.ok_or(ValidationError::MissingField("amount"))?;
        validate_amount(amount)
    }
}

/// 銀行口座（`BankAccount`頂点）
///
/// IBANで一意に識別される。作成時には所有者となる人物が存在している必要があり、
/// 人物から口座へ`owns_account`エッジが張られる。
use serde::{Deserialize, Serialize};

use super::validation::{require_finite, require_non_blank, ValidationError};

/// グラフ上の頂点ラベル
pub const BANK_ACCOUNT_LABEL: &str = "BankAccount";

/// 業務キーのプロパティ名
pub const IBAN_PROPERTY: &str = "IBAN";

/// 所有関係のエッジラベル（Person → BankAccount）
pub const OWNS_ACCOUNT_LABEL: &str = "owns_account";

/// 銀行口座レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    #[serde(rename = "IBAN")]
    pub iban: String,
    pub current_balance: f64,
}

/// 銀行口座作成ペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBankAccount {
    /// 所有者の業務キー
    pub person_id: String,
    #[serde(rename = "IBAN")]
    pub iban: String,
    pub current_balance: f64,
}

impl CreateBankAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("personId", &self.person_id)?;
        require_non_blank("IBAN", &self.iban)?;
        require_finite("currentBalance", self.current_balance)
    }

    /// 頂点に保存するレコード部分を取り出す
    pub fn to_account(&self) -> BankAccount {
        BankAccount {
            iban: self.iban.clone(),
            current_balance: self.current_balance,
        }
    }
}

/// 銀行口座更新ペイロード（部分更新）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBankAccount {
    #[serde(rename = "IBAN", default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<f64>,
}

impl UpdateBankAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(iban) = &self.iban {
            require_non_blank("IBAN", iban)?;
        }
        if let Some(balance) = self.current_balance {
            require_finite("currentBalance", balance)?;
        }
        Ok(())
    }
}

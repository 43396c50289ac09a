/// 入力検証
///
/// 作成・更新ペイロードに共通する検証ルールとエラー型を提供する。
/// 検証はグラフストアへの問い合わせより前に行われ、失敗時は書き込みを一切行わない。
use thiserror::Error;

/// 入力検証エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// 必須フィールドが空文字列または空白のみ
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// 必須フィールドが指定されていない
    #[error("Malformed request: {0} is required")]
    MissingField(&'static str),

    /// メールアドレスの形式が不正
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// 数値が有限でない（NaN, Infinity）
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// 取引金額が0以下
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// 自分自身との友人関係
    #[error("A person cannot be friends with themselves.")]
    SelfFriendship,
}

/// 空白のみの文字列を拒否する
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// メールアドレスの形式を検証する
///
/// `local@domain` 形式で、ローカル部とドメイン部が空でなく、
/// ドメイン部にドット区切りのラベルが2つ以上あることを要求する。
/// 空白を含むアドレスは拒否する。
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// 有限な数値であることを検証する
pub fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    Ok(())
}

/// 取引金額が正の有限値であることを検証する
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    require_finite("amount", amount)?;
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}

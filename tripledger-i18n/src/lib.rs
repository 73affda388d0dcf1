#[cfg(all(feature = "zh-tw", feature = "en"))]
compile_error!("Cannot enable both 'zh-tw' and 'en' features at the same time");

#[cfg(feature = "zh-tw")]
pub mod strings {
    pub const MEMBER: &str = "成員";
    pub const BALANCE: &str = "結餘";
    pub const FROM: &str = "付款人";
    pub const TO: &str = "收款人";
    pub const AMOUNT: &str = "金額";
    pub const CATEGORY: &str = "類別";
    pub const TOTAL: &str = "總計";
    pub const PERCENT: &str = "比例";
    pub const ITEMS: &str = "筆數";
    pub const DATE: &str = "日期";
    pub const ID: &str = "編號";
    pub const PAYER: &str = "付款人";
    pub const SPLIT: &str = "分攤";
    pub const NOTE: &str = "備註";
    pub const STATUS: &str = "狀態";
    pub const SHARE: &str = "應付";
    pub const CURRENCY: &str = "幣別";
    pub const RATE: &str = "匯率";
    pub const SCOPE: &str = "範圍";
    pub const SCOPE_GLOBAL: &str = "總額還款";
    pub const TEAM_TOTAL: &str = "團隊總支出";
    pub const ALL_SETTLED: &str = "帳目已結清";
    pub const NO_RECORDS: &str = "尚無紀錄";
    pub const NOTHING_CHANGED: &str = "沒有任何變更";
    pub const TITLE: &str = "名稱";
    pub const KIND: &str = "類型";
    pub const BASE_COST: &str = "折合本幣";

    pub const STATUS_NOT_IN_SPLIT: &str = "未分攤";
    pub const STATUS_PAYER: &str = "付款人";
    pub const STATUS_SETTLED: &str = "已還款";
    pub const STATUS_COVERED: &str = "已由總額還款結清";
    pub const STATUS_NO_DEBT: &str = "無欠款";
    pub const STATUS_OUTSTANDING: &str = "待還款";

    pub const CATEGORY_FOOD: &str = "餐飲";
    pub const CATEGORY_TRANSPORT: &str = "交通";
    pub const CATEGORY_SHOPPING: &str = "購物";
    pub const CATEGORY_ACCOMMODATION: &str = "住宿";
    pub const CATEGORY_TICKET: &str = "票券";
    pub const CATEGORY_ACTIVITY: &str = "活動";
    pub const CATEGORY_OTHERS: &str = "其他";
}

#[cfg(not(feature = "zh-tw"))]
pub mod strings {
    pub const MEMBER: &str = "Member";
    pub const BALANCE: &str = "Balance";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const CATEGORY: &str = "Category";
    pub const TOTAL: &str = "Total";
    pub const PERCENT: &str = "Share";
    pub const ITEMS: &str = "Items";
    pub const DATE: &str = "Date";
    pub const ID: &str = "ID";
    pub const PAYER: &str = "Paid by";
    pub const SPLIT: &str = "Split with";
    pub const NOTE: &str = "Note";
    pub const STATUS: &str = "Status";
    pub const SHARE: &str = "Owes";
    pub const CURRENCY: &str = "Currency";
    pub const RATE: &str = "Rate";
    pub const SCOPE: &str = "Scope";
    pub const SCOPE_GLOBAL: &str = "Balance repayment";
    pub const TEAM_TOTAL: &str = "Team total";
    pub const ALL_SETTLED: &str = "Everyone is settled up";
    pub const NO_RECORDS: &str = "No records yet";
    pub const NOTHING_CHANGED: &str = "Nothing changed";
    pub const TITLE: &str = "Title";
    pub const KIND: &str = "Kind";
    pub const BASE_COST: &str = "In base";

    pub const STATUS_NOT_IN_SPLIT: &str = "Not in split";
    pub const STATUS_PAYER: &str = "Payer";
    pub const STATUS_SETTLED: &str = "Settled";
    pub const STATUS_COVERED: &str = "Covered by repayment";
    pub const STATUS_NO_DEBT: &str = "Nothing owed";
    pub const STATUS_OUTSTANDING: &str = "Outstanding";

    pub const CATEGORY_FOOD: &str = "Food";
    pub const CATEGORY_TRANSPORT: &str = "Transport";
    pub const CATEGORY_SHOPPING: &str = "Shopping";
    pub const CATEGORY_ACCOMMODATION: &str = "Accommodation";
    pub const CATEGORY_TICKET: &str = "Ticket";
    pub const CATEGORY_ACTIVITY: &str = "Activity";
    pub const CATEGORY_OTHERS: &str = "Others";
}

pub use strings::*;

#[cfg(feature = "zh-tw")]
pub fn expense_not_found(id: impl std::fmt::Display) -> String {
    format!("找不到支出紀錄 {id}")
}

#[cfg(feature = "zh-tw")]
pub fn invalid_expense(detail: impl std::fmt::Display) -> String {
    format!("支出資料有誤：{detail}")
}

#[cfg(feature = "zh-tw")]
pub fn invalid_settlement(detail: impl std::fmt::Display) -> String {
    format!("無法記錄還款：{detail}")
}

#[cfg(feature = "zh-tw")]
pub fn invalid_rate(detail: impl std::fmt::Display) -> String {
    format!("無法更新匯率：{detail}")
}

#[cfg(feature = "zh-tw")]
pub fn rate_refresh_failed(detail: impl std::fmt::Display) -> String {
    format!("匯率更新失敗，保留原匯率：{detail}")
}

#[cfg(feature = "zh-tw")]
pub fn write_not_saved(detail: impl std::fmt::Display) -> String {
    format!("變更未能同步，僅保留於本次執行：{detail}")
}

#[cfg(feature = "zh-tw")]
pub fn expense_added(id: impl std::fmt::Display) -> String {
    format!("已新增支出 {id}")
}

#[cfg(feature = "zh-tw")]
pub fn settlement_recorded(id: impl std::fmt::Display) -> String {
    format!("已記錄還款 {id}")
}

#[cfg(feature = "zh-tw")]
pub fn settlement_undone(id: impl std::fmt::Display) -> String {
    format!("已撤銷還款 {id}")
}

#[cfg(feature = "zh-tw")]
pub fn share_unchanged(status: impl std::fmt::Display) -> String {
    format!("此筆分攤無法切換（{status}）")
}

#[cfg(feature = "zh-tw")]
pub fn rates_refreshed(count: usize) -> String {
    format!("已更新 {count} 種匯率")
}

#[cfg(not(feature = "zh-tw"))]
pub fn expense_not_found(id: impl std::fmt::Display) -> String {
    format!("Expense {id} does not exist")
}

#[cfg(not(feature = "zh-tw"))]
pub fn invalid_expense(detail: impl std::fmt::Display) -> String {
    format!("Invalid expense: {detail}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn invalid_settlement(detail: impl std::fmt::Display) -> String {
    format!("Cannot record settlement: {detail}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn invalid_rate(detail: impl std::fmt::Display) -> String {
    format!("Cannot change rate: {detail}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn rate_refresh_failed(detail: impl std::fmt::Display) -> String {
    format!("Rate refresh failed, keeping current rates: {detail}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn write_not_saved(detail: impl std::fmt::Display) -> String {
    format!("Change was not saved to the trip document: {detail}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn expense_added(id: impl std::fmt::Display) -> String {
    format!("Added expense {id}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn settlement_recorded(id: impl std::fmt::Display) -> String {
    format!("Recorded settlement {id}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn settlement_undone(id: impl std::fmt::Display) -> String {
    format!("Undid settlement {id}")
}

#[cfg(not(feature = "zh-tw"))]
pub fn share_unchanged(status: impl std::fmt::Display) -> String {
    format!("This share cannot be toggled ({status})")
}

#[cfg(not(feature = "zh-tw"))]
pub fn rates_refreshed(count: usize) -> String {
    match count {
        1 => "Refreshed 1 rate".to_string(),
        _ => format!("Refreshed {count} rates"),
    }
}

use super::amount;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 付款记录 (金额 + 日期)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, deserialize_with = "amount::lenient")]
    pub amount: BigDecimal,
    #[serde(default, deserialize_with = "amount::opaque_text")]
    pub date: Option<String>,
}

/// 订单 (一次送货交易)
///
/// `total` / `original_total` 由上游录入, 本模块不重新计算;
/// `profit` 为未调整的基础利润, 三个调整项相互独立, 需全部累加.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "amount::opaque_text")]
    pub party_name: Option<String>,
    #[serde(default, deserialize_with = "amount::opaque_text")]
    pub truck_no: Option<String>,
    #[serde(default, deserialize_with = "amount::opaque_text")]
    pub date: Option<String>,

    // 销售侧
    #[serde(default, deserialize_with = "amount::lenient")]
    pub weight: BigDecimal,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub rate: BigDecimal,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub total: BigDecimal,

    // 成本侧
    #[serde(default, deserialize_with = "amount::lenient")]
    pub original_weight: BigDecimal,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub original_rate: BigDecimal,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub original_total: BigDecimal,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub additional_cost: BigDecimal,

    #[serde(default, deserialize_with = "amount::lenient")]
    pub profit: BigDecimal,
    /// 费用调整 (通常 <= 0, 扣减)
    #[serde(default, deserialize_with = "amount::lenient")]
    pub expense_adjustment: BigDecimal,
    /// 收入调整 (加项)
    #[serde(default, deserialize_with = "amount::lenient")]
    pub revenue_adjustment: BigDecimal,
    /// 手工调整 (加项)
    #[serde(default, deserialize_with = "amount::lenient")]
    pub adjustment_amount: BigDecimal,

    /// 原材料付款 (向供应商付出的钱)
    #[serde(default, deserialize_with = "amount::lenient_list")]
    pub partial_payments: Vec<Payment>,
    /// 客户付款 (发票侧, 预留)
    #[serde(default, deserialize_with = "amount::lenient_list")]
    pub customer_payments: Vec<Payment>,
}

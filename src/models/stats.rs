use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 付款状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

/// 仪表盘统计快照 (每次聚合重新计算, 不落库)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_weight: BigDecimal,
    pub total_cost: BigDecimal,
    /// 与 total_cost 同值, 供不同展示层使用
    pub cost_amount: BigDecimal,
    pub total_profit: BigDecimal,
    /// 与 total_profit 同值
    pub estimated_profit: BigDecimal,
    /// 已付原材料款 (实际是付出的钱, 字段名沿用历史命名)
    pub raw_material_payments_received: BigDecimal,
    /// 未付原材料款 (每单下限为 0)
    pub raw_material_payments_outstanding: BigDecimal,
    pub paid_orders: usize,
    /// partial 订单同时计入 unpaid_orders
    pub partial_orders: usize,
    pub unpaid_orders: usize,
    pub customer_payments_received: BigDecimal,
    pub money_out: BigDecimal,
    pub calculated_balance: BigDecimal,
}

use serde::{Deserialize, Serialize};

/// 批量清理开关
///
/// 反序列化时逐字段与默认值合并: 请求体只需给出要覆盖的开关.
/// 默认清空全部财务历史, 但保留订单本身.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClearOptions {
    pub clear_investment: bool,
    pub clear_ledger: bool,
    pub clear_activity_logs: bool,
    pub clear_party_payments: bool,
    /// 清空订单上的付款和手工调整 (clear_orders 为 true 时忽略)
    pub clear_order_payments: bool,
    /// 删除订单文档本身
    pub clear_orders: bool,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            clear_investment: true,
            clear_ledger: true,
            clear_activity_logs: true,
            clear_party_payments: true,
            clear_order_payments: true,
            clear_orders: false,
        }
    }
}

impl ClearOptions {
    /// 全部关闭, 便于只打开个别开关
    pub fn none() -> Self {
        Self {
            clear_investment: false,
            clear_ledger: false,
            clear_activity_logs: false,
            clear_party_payments: false,
            clear_order_payments: false,
            clear_orders: false,
        }
    }
}

/// 清理结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub batches_committed: usize,
    pub documents_deleted: usize,
    pub orders_reset: usize,
}

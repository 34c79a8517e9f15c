use crate::models::Order;
use bigdecimal::{BigDecimal, Zero};

/// 调整后利润 = 基础利润 + 费用调整 + 收入调整 + 手工调整
///
/// 不校验符号: 费用调整按约定为负数 (扣减), 其余两项为加项, 这里一律相加.
pub fn adjusted_profit(order: &Order) -> BigDecimal {
    &order.profit + &order.expense_adjustment + &order.revenue_adjustment + &order.adjustment_amount
}

/// 任一调整项非零即视为有调整
pub fn has_profit_adjustments(order: &Order) -> bool {
    !order.expense_adjustment.is_zero()
        || !order.revenue_adjustment.is_zero()
        || !order.adjustment_amount.is_zero()
}

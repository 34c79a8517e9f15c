use super::profit::adjusted_profit;
use crate::models::{DashboardStats, EntryType, LedgerEntry, Order, PaymentStatus};
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

/// 付款容差 (货币单位): 差额在此之内视为已付清
pub const PAYMENT_TOLERANCE: i64 = 250;

/// 原材料付款状态判定
///
/// - paid:    已付 >= 成本 - 容差, 且成本 > 0
/// - partial: 有付款但不足
/// - unpaid:  没有任何付款
pub fn classify_payment(original_total: &BigDecimal, paid: &BigDecimal) -> PaymentStatus {
    let tolerance = BigDecimal::from(PAYMENT_TOLERANCE);
    if *original_total > BigDecimal::zero() && *paid >= original_total - &tolerance {
        PaymentStatus::Paid
    } else if *paid > BigDecimal::zero() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

/// 单个订单的原材料付款合计
pub fn raw_material_paid(order: &Order) -> BigDecimal {
    order
        .partial_payments
        .iter()
        .fold(BigDecimal::zero(), |acc, p| acc + &p.amount)
}

/// 单个订单的未付原材料款 (下限 0)
pub fn raw_material_outstanding(order: &Order, paid: &BigDecimal) -> BigDecimal {
    std::cmp::max(BigDecimal::zero(), &order.original_total - paid)
}

/// 聚合仪表盘统计
///
/// 订单部分不受时间范围影响; `range_start` / `range_end` 只过滤账本条目, 且均为闭区间.
/// 不传账本时, 账本相关字段保持为 0.
pub fn calculate_stats(
    orders: &[Order],
    ledger_entries: Option<&[LedgerEntry]>,
    range_start: Option<DateTime<Utc>>,
    range_end: Option<DateTime<Utc>>,
) -> DashboardStats {
    let mut stats = DashboardStats {
        total_orders: orders.len(),
        ..DashboardStats::default()
    };

    for order in orders {
        stats.total_weight += &order.weight;

        let order_cost = &order.original_total + &order.additional_cost;
        stats.total_cost += &order_cost;
        stats.cost_amount += &order_cost;

        let profit = adjusted_profit(order);
        stats.total_profit += &profit;
        stats.estimated_profit += &profit;

        let paid = raw_material_paid(order);
        stats.raw_material_payments_received += &paid;
        stats.raw_material_payments_outstanding += raw_material_outstanding(order, &paid);

        match classify_payment(&order.original_total, &paid) {
            PaymentStatus::Paid => stats.paid_orders += 1,
            PaymentStatus::Partial => {
                stats.partial_orders += 1;
                stats.unpaid_orders += 1;
            }
            PaymentStatus::Unpaid => stats.unpaid_orders += 1,
        }
    }

    if let Some(entries) = ledger_entries {
        let mut total_income = BigDecimal::zero();
        let mut in_range = 0usize;

        for entry in entries {
            if range_start.is_some_and(|start| entry.date < start)
                || range_end.is_some_and(|end| entry.date > end)
            {
                continue;
            }
            in_range += 1;

            match entry.entry_type {
                EntryType::Credit => {
                    total_income += &entry.amount;
                    if entry.has_party() {
                        stats.customer_payments_received += &entry.amount;
                    }
                }
                EntryType::Debit => stats.money_out += &entry.amount,
            }
        }

        stats.calculated_balance = &stats.customer_payments_received - &stats.money_out;
        tracing::debug!(
            "Ledger pass: {}/{} entries in range, income {}, money out {}",
            in_range, entries.len(), total_income, stats.money_out
        );
    }

    stats
}

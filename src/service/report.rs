use super::profit::{adjusted_profit, has_profit_adjustments};
use super::stats::{classify_payment, raw_material_outstanding, raw_material_paid};
use crate::models::Order;
use std::io::Write;

const HEADER: [&str; 10] = [
    "id",
    "partyName",
    "truckNo",
    "profit",
    "adjustedProfit",
    "hasAdjustments",
    "originalTotal",
    "rawMaterialPaid",
    "rawMaterialOutstanding",
    "paymentStatus",
];

/// 导出订单利润明细 CSV
pub fn write_profit_report<W: Write>(orders: &[Order], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for order in orders {
        let paid = raw_material_paid(order);
        writer.write_record(&[
            order.id.clone(),
            order.party_name.clone().unwrap_or_default(),
            order.truck_no.clone().unwrap_or_default(),
            order.profit.to_string(),
            adjusted_profit(order).to_string(),
            has_profit_adjustments(order).to_string(),
            order.original_total.to_string(),
            paid.to_string(),
            raw_material_outstanding(order, &paid).to_string(),
            classify_payment(&order.original_total, &paid).as_str().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

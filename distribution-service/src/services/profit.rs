//! Pure arithmetic for the recorder and the profit-distribution engine.
//!
//! Everything here is exact `Decimal` math over already-loaded rows so the
//! close-time algorithm can be tested without a database. Monetary results
//! are rounded to two decimal places, matching the NUMERIC(12,2) columns.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::Partner;

const MONEY_DP: u32 = 2;

/// Derived fields of a farm purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseFigures {
    pub net_chicken_weight: Decimal,
    pub total_amount: Decimal,
    pub remaining_amount: Decimal,
}

/// Net weight on the scale minus the tare of vehicle and cages, priced per
/// kilogram; the unpaid remainder becomes farm debt.
pub fn purchase_figures(
    empty_vehicle_weight: Decimal,
    loaded_vehicle_weight: Decimal,
    cage_count: i32,
    cage_weight_per_unit: Decimal,
    price_per_kg: Decimal,
    paid_amount: Decimal,
) -> PurchaseFigures {
    let net_chicken_weight = loaded_vehicle_weight
        - empty_vehicle_weight
        - Decimal::from(cage_count) * cage_weight_per_unit;
    let total_amount = (net_chicken_weight * price_per_kg).round_dp(MONEY_DP);
    let remaining_amount = total_amount - paid_amount;
    PurchaseFigures {
        net_chicken_weight,
        total_amount,
        remaining_amount,
    }
}

/// Derived fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleFigures {
    pub net_chicken_weight: Decimal,
    pub total_amount: Decimal,
    pub remaining_amount: Decimal,
}

pub fn sale_figures(
    loaded_cages_weight: Decimal,
    empty_cages_weight: Decimal,
    price_per_kg: Decimal,
    paid_amount: Decimal,
) -> SaleFigures {
    let net_chicken_weight = loaded_cages_weight - empty_cages_weight;
    let total_amount = (net_chicken_weight * price_per_kg).round_dp(MONEY_DP);
    let remaining_amount = total_amount - paid_amount;
    SaleFigures {
        net_chicken_weight,
        total_amount,
        remaining_amount,
    }
}

/// Value of chickens lost in transit.
pub fn loss_amount(dead_weight: Decimal, price_per_kg: Decimal) -> Decimal {
    (dead_weight * price_per_kg).round_dp(MONEY_DP)
}

/// One partner's computed allocation, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAllocation {
    pub partner_id: Uuid,
    pub base_profit_share: Decimal,
    pub vehicle_cost_share: Decimal,
    pub final_profit: Decimal,
}

/// Split `net_profit` across all partners by investment percentage. Partners
/// who do not co-own the vehicle fund their percentage of the vehicle costs
/// out of their share; vehicle partners are exempt.
pub fn allocate_shares(
    net_profit: Decimal,
    vehicle_costs: Decimal,
    partners: &[Partner],
) -> Vec<ShareAllocation> {
    let hundred = Decimal::ONE_HUNDRED;
    partners
        .iter()
        .map(|partner| {
            let pct = partner.investment_percentage;
            let base_profit_share = (net_profit * pct / hundred).round_dp(MONEY_DP);
            let vehicle_cost_share = if partner.is_vehicle_partner {
                Decimal::ZERO
            } else {
                (vehicle_costs * pct / hundred).round_dp(MONEY_DP)
            };
            ShareAllocation {
                partner_id: partner.partner_id,
                base_profit_share,
                vehicle_cost_share,
                final_profit: base_profit_share - vehicle_cost_share,
            }
        })
        .collect()
}

/// Reconciliation drift after allocation.
///
/// When the investment percentages sum to 100, the base shares must re-add
/// to the net profit regardless of who co-owns the vehicle, so the drift is
/// `|net_profit - sum(base_profit_share)|`. Anything beyond rounding means
/// the percentages are off or the allocation is wrong.
pub fn reconciliation_drift(net_profit: Decimal, shares: &[ShareAllocation]) -> Decimal {
    let distributed: Decimal = shares.iter().map(|s| s.base_profit_share).sum();
    (net_profit - distributed).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn partner(pct: &str, vehicle: bool) -> Partner {
        Partner {
            partner_id: Uuid::new_v4(),
            name: "p".to_string(),
            phone: None,
            address: None,
            investment_amount: Decimal::ZERO,
            investment_percentage: pct.parse().unwrap(),
            is_vehicle_partner: vehicle,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn purchase_figures_subtract_tare_and_track_remainder() {
        let f = purchase_figures(
            dec("1000.00"),
            dec("2500.00"),
            50,
            dec("2.00"),
            dec("4.00"),
            dec("1000.00"),
        );
        // 2500 - 1000 - 50*2 = 1400 kg at 4/kg
        assert_eq!(f.net_chicken_weight, dec("1400.00"));
        assert_eq!(f.total_amount, dec("5600.00"));
        assert_eq!(f.remaining_amount, dec("4600.00"));
    }

    #[test]
    fn sale_figures_remaining_is_total_minus_paid() {
        let f = sale_figures(dec("800.00"), dec("100.00"), dec("5.00"), dec("3000.00"));
        assert_eq!(f.net_chicken_weight, dec("700.00"));
        assert_eq!(f.total_amount, dec("3500.00"));
        assert_eq!(f.remaining_amount, dec("500.00"));
    }

    #[test]
    fn loss_amount_is_weight_times_price() {
        assert_eq!(loss_amount(dec("40.00"), dec("5.00")), dec("200.00"));
    }

    #[test]
    fn allocation_splits_profit_and_deducts_vehicle_costs() {
        // net_profit 3000, vehicle_costs 500; A 40% no vehicle, B 60% vehicle.
        let a = partner("40", false);
        let b = partner("60", true);
        let shares = allocate_shares(
            dec("3000.00"),
            dec("500.00"),
            &[a.clone(), b.clone()],
        );

        assert_eq!(shares[0].base_profit_share, dec("1200.00"));
        assert_eq!(shares[0].vehicle_cost_share, dec("200.00"));
        assert_eq!(shares[0].final_profit, dec("1000.00"));

        assert_eq!(shares[1].base_profit_share, dec("1800.00"));
        assert_eq!(shares[1].vehicle_cost_share, Decimal::ZERO);
        assert_eq!(shares[1].final_profit, dec("1800.00"));

        let final_sum: Decimal = shares.iter().map(|s| s.final_profit).sum();
        assert_eq!(final_sum, dec("2800.00"));
    }

    #[test]
    fn vehicle_partner_pays_no_vehicle_cost_share() {
        let shares = allocate_shares(dec("1000.00"), dec("400.00"), &[partner("100", true)]);
        assert_eq!(shares[0].vehicle_cost_share, Decimal::ZERO);
        assert_eq!(shares[0].final_profit, dec("1000.00"));
    }

    #[test]
    fn negative_net_profit_allocates_negative_shares() {
        let shares = allocate_shares(dec("-500.00"), Decimal::ZERO, &[partner("50", false)]);
        assert_eq!(shares[0].base_profit_share, dec("-250.00"));
        assert_eq!(shares[0].final_profit, dec("-250.00"));
    }

    #[test]
    fn drift_is_zero_when_percentages_cover_the_whole() {
        let shares = allocate_shares(
            dec("3000.00"),
            dec("500.00"),
            &[partner("40", false), partner("60", true)],
        );
        assert_eq!(reconciliation_drift(dec("3000.00"), &shares), Decimal::ZERO);
    }

    #[test]
    fn drift_surfaces_percentage_gaps() {
        // Percentages only sum to 90; a tenth of the profit goes unclaimed.
        let shares = allocate_shares(
            dec("3000.00"),
            Decimal::ZERO,
            &[partner("40", false), partner("50", true)],
        );
        assert_eq!(reconciliation_drift(dec("3000.00"), &shares), dec("300.00"));
    }

    #[test]
    fn fractional_percentages_round_to_money_precision() {
        let shares = allocate_shares(dec("100.00"), Decimal::ZERO, &[partner("33.33", false)]);
        assert_eq!(shares[0].base_profit_share, dec("33.33"));
    }
}

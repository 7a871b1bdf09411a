use super::domain::{
    clamp_ratio, round_one_decimal, Allocation, AllocationMode, AllocationRequest,
    CoOwnerAdjustment, TotalStatus, FULL_SHARE,
};

/// Totals within this distance of 100 after one-decimal rounding count as whole.
const TOTAL_TOLERANCE: f64 = 1e-9;

/// Recompute every holder's ratio for the requested mode.
///
/// Deductions are floored at zero. Whatever gap flooring leaves against 100
/// stays in the total and shows up in `status`; nothing is rebalanced.
/// Status and total are judged on the unrounded ratios. In proportional
/// mode a balanced split hands the one-decimal rounding residue to the
/// existing owner so the written ratios add up to exactly 100.
pub fn reallocate(request: &AllocationRequest) -> Allocation {
    let new_owner_ratio = clamp_ratio(request.new_owner_ratio);
    let existing_original_ratio = request.existing_owner_original_ratio();

    let (existing_raw, co_owners_raw) = match request.mode {
        AllocationMode::Manual => manual_ratios(request, existing_original_ratio),
        _ if request.other_co_owners.is_empty() => (FULL_SHARE - new_owner_ratio, Vec::new()),
        mode => deducted_ratios(request, mode, existing_original_ratio, new_owner_ratio),
    };

    let raw_total = existing_raw
        + new_owner_ratio
        + co_owners_raw
            .iter()
            .map(|adjustment| adjustment.ratio)
            .sum::<f64>();
    let status = total_status(raw_total);

    let (existing_ratio, co_owners) = match request.mode {
        AllocationMode::Manual => (existing_raw, co_owners_raw),
        mode => {
            let co_owners: Vec<CoOwnerAdjustment> = co_owners_raw
                .into_iter()
                .map(|adjustment| CoOwnerAdjustment {
                    ratio: round_one_decimal(adjustment.ratio),
                    ..adjustment
                })
                .collect();
            let existing_ratio = if mode == AllocationMode::Proportional && status.is_balanced() {
                let others: f64 = co_owners.iter().map(|adjustment| adjustment.ratio).sum();
                round_one_decimal((FULL_SHARE - new_owner_ratio - others).max(0.0))
            } else {
                round_one_decimal(existing_raw)
            };
            (existing_ratio, co_owners)
        }
    };

    Allocation {
        mode: request.mode,
        existing_original_ratio,
        existing_ratio,
        new_owner_ratio,
        co_owners,
        total: round_one_decimal(raw_total),
        status,
    }
}

pub fn total_status(total: f64) -> TotalStatus {
    let gap = round_one_decimal(total - FULL_SHARE);
    if gap.abs() < TOTAL_TOLERANCE {
        TotalStatus::Balanced
    } else if gap > 0.0 {
        TotalStatus::Exceeds { excess: gap }
    } else {
        TotalStatus::Under { shortfall: -gap }
    }
}

/// Floored but unrounded ratios for the automatic modes.
fn deducted_ratios(
    request: &AllocationRequest,
    mode: AllocationMode,
    existing_original_ratio: f64,
    total_deduction: f64,
) -> (f64, Vec<CoOwnerAdjustment>) {
    let holders = request.other_co_owners.len() + 1;
    let deduct = |original: f64| -> f64 {
        let deduction = match mode {
            AllocationMode::Equal => total_deduction / holders as f64,
            _ => (original / FULL_SHARE) * total_deduction,
        };
        (original - deduction).max(0.0)
    };

    let existing_ratio = deduct(existing_original_ratio);
    let co_owners = request
        .other_co_owners
        .iter()
        .map(|share| {
            let original_ratio = clamp_ratio(share.original_ratio);
            CoOwnerAdjustment {
                owner_id: share.owner_id.clone(),
                original_ratio,
                ratio: deduct(original_ratio),
            }
        })
        .collect();

    (existing_ratio, co_owners)
}

fn manual_ratios(
    request: &AllocationRequest,
    existing_original_ratio: f64,
) -> (f64, Vec<CoOwnerAdjustment>) {
    let existing_ratio = request
        .manual
        .existing_ratio
        .map(clamp_ratio)
        .unwrap_or(existing_original_ratio);

    let co_owners = request
        .other_co_owners
        .iter()
        .map(|share| {
            let original_ratio = clamp_ratio(share.original_ratio);
            let ratio = request
                .manual
                .co_owner_ratios
                .get(&share.owner_id)
                .copied()
                .map(clamp_ratio)
                .unwrap_or(original_ratio);
            CoOwnerAdjustment {
                owner_id: share.owner_id.clone(),
                original_ratio,
                ratio,
            }
        })
        .collect();

    (existing_ratio, co_owners)
}

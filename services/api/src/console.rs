use crate::infra::{
    parse_mode, parse_owner_ratio, InMemoryMemberRepository, InMemoryParcelDirectory,
};
use clap::Args;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use union_portal::config::BulkConfig;
use union_portal::error::AppError;
use union_portal::workflows::ownership::{
    format_ratio, reallocate, Allocation, AllocationMode, AllocationRequest, CoOwnerShare,
    ManualOverrides, OwnerId,
};
use union_portal::workflows::parcels::{
    parse_member_rows, parse_parcel_rows, MatchKind, MatchingError, MemberMatchingService,
};
use union_portal::workflows::tenancy::UnionId;

#[derive(Args, Debug)]
pub(crate) struct ReallocateArgs {
    /// Share taken by the new co-owner, in percent
    #[arg(long)]
    pub(crate) new_owner_ratio: f64,
    /// proportional, equal or manual
    #[arg(long, value_parser = parse_mode, default_value = "proportional")]
    pub(crate) mode: AllocationMode,
    /// Other co-owner and the ratio held before the split (ID=RATIO, repeatable)
    #[arg(long, value_parser = parse_owner_ratio)]
    pub(crate) co_owner: Vec<(String, f64)>,
    /// Manual mode: ratio the existing owner keeps
    #[arg(long)]
    pub(crate) existing_ratio: Option<f64>,
    /// Manual mode: ratio a co-owner ends up with (ID=RATIO, repeatable)
    #[arg(long = "set", value_parser = parse_owner_ratio)]
    pub(crate) manual: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
pub(crate) struct MembersMatchArgs {
    /// Parcel table CSV (pnu, 지번주소, 도로명주소)
    #[arg(long)]
    pub(crate) parcels: PathBuf,
    /// Member spreadsheet CSV (이름, 물건지주소, 동, 호, ...)
    #[arg(long)]
    pub(crate) members: PathBuf,
    /// Union the rows belong to
    #[arg(long, default_value = "default")]
    pub(crate) union: String,
}

pub(crate) fn run_reallocate(args: ReallocateArgs) -> Result<(), AppError> {
    let request = allocation_request(args);
    let allocation = reallocate(&request);
    print!("{}", render_allocation(&allocation));
    Ok(())
}

pub(crate) fn allocation_request(args: ReallocateArgs) -> AllocationRequest {
    let ReallocateArgs {
        new_owner_ratio,
        mode,
        co_owner,
        existing_ratio,
        manual,
    } = args;

    AllocationRequest {
        mode,
        new_owner_ratio,
        other_co_owners: co_owner
            .into_iter()
            .map(|(owner_id, original_ratio)| CoOwnerShare {
                owner_id: OwnerId::new(owner_id),
                original_ratio,
            })
            .collect(),
        manual: ManualOverrides {
            existing_ratio,
            co_owner_ratios: manual
                .into_iter()
                .map(|(owner_id, ratio)| (OwnerId::new(owner_id), ratio))
                .collect::<BTreeMap<_, _>>(),
        },
    }
}

pub(crate) fn render_allocation(allocation: &Allocation) -> String {
    let mut lines = vec![
        format!("Share reallocation ({})", allocation.mode.label()),
        format!("  {:<16}{:>10}{:>10}", "Owner", "Before", "After"),
        format!(
            "  {:<16}{:>10}{:>10}",
            "existing owner",
            format_ratio(allocation.existing_original_ratio),
            format_ratio(allocation.existing_ratio)
        ),
    ];
    for adjustment in &allocation.co_owners {
        lines.push(format!(
            "  {:<16}{:>10}{:>10}",
            adjustment.owner_id.to_string(),
            format_ratio(adjustment.original_ratio),
            format_ratio(adjustment.ratio)
        ));
    }
    lines.push(format!(
        "  {:<16}{:>10}{:>10}",
        "new owner",
        "-",
        format_ratio(allocation.new_owner_ratio)
    ));
    lines.push(format!(
        "  {:<16}{:>10}{:>10}  {}",
        "total",
        "",
        format_ratio(allocation.total),
        allocation.status.message()
    ));

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

pub(crate) fn run_members_match(args: MembersMatchArgs) -> Result<(), AppError> {
    let union_id = UnionId::new(args.union);
    let parcels = InMemoryParcelDirectory::default();
    let loaded = parcels.load(
        union_id.clone(),
        parse_parcel_rows(File::open(&args.parcels)?)?,
    );
    let rows = parse_member_rows(File::open(&args.members)?)?;

    let service = MemberMatchingService::new(
        Arc::new(parcels),
        Arc::new(InMemoryMemberRepository::default()),
        BulkConfig::default().batch_size,
    );

    println!(
        "Matching {} member rows against {} parcels ({})",
        rows.len(),
        loaded,
        union_id
    );

    let mut matched = 0;
    let mut unmatched = 0;
    let mut conflicts = 0;
    for (index, row) in rows.into_iter().enumerate() {
        let name = row.name.clone();
        let address = row.property_address.clone();
        match service.register(&union_id, row) {
            Ok(outcome) => match outcome.address_match {
                Some(found) => {
                    matched += 1;
                    let kind = match found.kind {
                        MatchKind::Exact => "exact",
                        MatchKind::Partial => "partial",
                    };
                    println!(
                        "{:>4}  {:<10} {} -> {} [{}] {}",
                        index + 1,
                        name,
                        address,
                        found.pnu,
                        kind,
                        found.matched_address
                    );
                }
                None => {
                    unmatched += 1;
                    println!(
                        "{:>4}  {:<10} {} -> unmatched, saved for manual review",
                        index + 1,
                        name,
                        address
                    );
                }
            },
            Err(err @ MatchingError::DuplicateClaim { .. }) => {
                conflicts += 1;
                println!("{:>4}  {:<10} conflict: {}", index + 1, name, err);
            }
            Err(MatchingError::Store(err)) => return Err(MatchingError::Store(err).into()),
            Err(err) => println!("{:>4}  {:<10} skipped: {}", index + 1, name, err),
        }
    }

    println!("\nMatched: {matched}  Unmatched: {unmatched}  Conflicts: {conflicts}");
    Ok(())
}

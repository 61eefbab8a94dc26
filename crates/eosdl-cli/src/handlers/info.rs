//! `eosdl info` handlers.

use std::slice;

use eosdl_core::{PackageType, ResolveFilter};

use crate::bootstrap::CliContext;
use crate::commands::{FilterArgs, InfoCommand};
use crate::error::CliError;
use crate::presentation::{print_branches, print_entries};

pub async fn execute(ctx: &CliContext, command: InfoCommand) -> Result<(), CliError> {
    match command {
        InfoCommand::Versions(args) => versions(ctx, &args).await,
        InfoCommand::Latest(args) => latest(ctx, &args).await,
        InfoCommand::Branches { package } => branches(ctx, package.into()).await,
    }
}

async fn versions(ctx: &CliContext, args: &FilterArgs) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let filter = ResolveFilter::latest(args.package.into())
        .with_branch(args.branch)
        .with_release_type(args.release_type);
    let entries = ctx.catalog.list(&session, &filter).await?;
    print_entries(&entries);
    Ok(())
}

async fn latest(ctx: &CliContext, args: &FilterArgs) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let entry = ctx
        .catalog
        .resolve_latest(&session, args.package.into(), args.branch, args.release_type)
        .await?;
    print_entries(slice::from_ref(&entry));
    Ok(())
}

async fn branches(ctx: &CliContext, package: PackageType) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let branches = ctx.catalog.branches(&session, package).await?;
    print_branches(&branches);
    Ok(())
}

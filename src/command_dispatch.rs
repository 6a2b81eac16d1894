//! Purpose: Hold top-level CLI command dispatch for `wirebox`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every command goes through the library's public `api`; no private parsing here.

use super::*;
use wirebox::api::{Decimal, DynHolder, HolderKind, ParameterSet, Rounding, TextCodec};

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Text { kind, literal } => {
            let kind = kind.parse::<HolderKind>()?;
            let mut holder = DynHolder::new(kind);
            holder.set_as_text(&literal)?;
            emit_json(json!({
                "kind": kind.name(),
                "text": holder.get_as_text(),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Decimal {
            literal,
            scale,
            rounding,
            normalize,
        } => {
            let rounding = rounding.parse::<Rounding>()?;
            let mut value = Decimal::parse(&literal)?;
            if let Some(scale) = scale {
                value = value.rescale(scale, rounding);
            }
            if normalize {
                value = value.normalized();
            }
            emit_json(json!({
                "text": value.to_text(),
                "magnitude": value.magnitude().to_string(),
                "scale": value.scale(),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Params { file } => {
            let set = ParameterSet::load(&file)?;
            emit_json(set.to_json());
            Ok(RunOutcome::ok())
        }
    }
}

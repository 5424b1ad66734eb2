use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

/// Reconciles alias bookkeeping and reports attachment drift.
pub fn run<B: StorageBackend>(store: &PasteStore<B>) -> Result<CmdResult> {
    let report = store.doctor()?;
    let mut result = CmdResult::default();

    let repairs = [
        (report.recreated_aliases, "alias slot(s) recreated"),
        (report.repointed_aliases, "alias pointer(s) repointed"),
        (report.dropped_aliases, "alias listing(s) dropped"),
        (report.removed_orphan_aliases, "orphan alias slot(s) removed"),
    ];
    for (count, label) in repairs {
        if count > 0 {
            result.add_message(CmdMessage::success(format!("{} {}", count, label)));
        }
    }

    let warnings = [
        (report.missing_attachments, "listed attachment(s) missing on disk"),
        (report.unlisted_files, "stored file(s) not listed in metadata"),
        (report.unreadable_slots, "slot(s) could not be read"),
    ];
    for (count, label) in warnings {
        if count > 0 {
            result.add_message(CmdMessage::warning(format!("{} {}", count, label)));
        }
    }

    if report.is_clean() {
        result.add_message(CmdMessage::info("No problems found"));
    }
    result.doctor_report = Some(report);
    Ok(result)
}

//! Watch and ignore commands
//!
//! Both maintain a name list in preferences, so they share one handler.

use crate::error::Result;
use crate::prefs::{FilePreferences, Preferences};
use crate::ui as output;

pub enum TrackedList {
    /// Packages checked by `outdated`.
    Watched,
    /// Packages skipped by every update check.
    Ignored,
}

pub struct WatchOptions {
    pub name: String,
    pub remove: bool,
    pub list: TrackedList,
}

pub fn run(options: WatchOptions) -> Result<()> {
    let prefs = FilePreferences::load()?;
    let (on_list, label) = match options.list {
        TrackedList::Watched => (prefs.is_watched(&options.name), "watch list"),
        TrackedList::Ignored => (prefs.is_ignored(&options.name), "ignore list"),
    };

    if options.remove && !on_list {
        output::info(&format!("{} is not on the {}", options.name, label));
        return Ok(());
    }
    if !options.remove && on_list {
        output::info(&format!("{} is already on the {}", options.name, label));
        return Ok(());
    }

    let now_on = match options.list {
        TrackedList::Watched => prefs.toggle_watched(&options.name)?,
        TrackedList::Ignored => prefs.toggle_ignored(&options.name)?,
    };

    if now_on {
        output::success(&format!("Added {} to the {}", options.name, label));
        if matches!(options.list, TrackedList::Watched) {
            output::info("Run `pkgsweep outdated` to check it");
        }
    } else {
        output::success(&format!("Removed {} from the {}", options.name, label));
    }
    Ok(())
}

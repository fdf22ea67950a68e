//! Build-history channel
//!
//! Append-only local record of past runs: one rendered HTML page per
//! build under `builds/`, plus a link appended to `index.html`. The
//! template and index are deployment artifacts; their absence is a hard
//! error for this channel.

use anyhow::Context;
use std::path::PathBuf;
use tokio::fs;

use girder_core::BuildHistoryEntry;

/// Filesystem-backed build history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Appends one run to the history.
    ///
    /// Renders `builds/_template.html` into `builds/<commit_id>.html`
    /// (replacing an earlier page for the same commit, if any) and adds
    /// a link line to the index.
    pub async fn append(&self, entry: &BuildHistoryEntry) -> anyhow::Result<()> {
        anyhow::ensure!(
            !entry.commit_id.contains(['/', '\\']) && !entry.commit_id.contains(".."),
            "commit id {:?} contains path separators",
            entry.commit_id
        );

        let template_path = self.root.join("builds").join("_template.html");
        let template = fs::read_to_string(&template_path)
            .await
            .with_context(|| format!("missing build template {}", template_path.display()))?;

        let page = template
            .replace("$commit_id", &entry.commit_id)
            .replace("$build_date", &entry.build_date)
            .replace("$build_logs", &entry.log);

        let page_path = self.root.join("builds").join(format!("{}.html", entry.commit_id));
        fs::write(&page_path, page)
            .await
            .with_context(|| format!("failed to write build page {}", page_path.display()))?;

        let index_path = self.root.join("index.html");
        let index = fs::read_to_string(&index_path)
            .await
            .with_context(|| format!("missing history index {}", index_path.display()))?;

        let link = format!(
            "<a href=\"builds/{0}.html\">{0} | {1}</a><br>\n",
            entry.commit_id, entry.build_date
        );
        fs::write(&index_path, insert_before_body_close(&index, &link))
            .await
            .with_context(|| format!("failed to update {}", index_path.display()))?;

        Ok(())
    }
}

/// Inserts a fragment just before the closing body tag, or appends it
/// when the index has no such tag.
fn insert_before_body_close(index: &str, fragment: &str) -> String {
    match index.rfind("</body>") {
        Some(pos) => {
            let mut updated = String::with_capacity(index.len() + fragment.len());
            updated.push_str(&index[..pos]);
            updated.push_str(fragment);
            updated.push_str(&index[pos..]);
            updated
        }
        None => {
            let mut updated = index.to_string();
            updated.push_str(fragment);
            updated
        }
    }
}

//! Conversion of a pull's Atlantis records into a [`UiData`] report.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::plan::{ScanOptions, correlate_files};
use crate::records::{PlanStatus, ProjectLock, ProjectStatus, PullStatus};

use super::ui::{UiData, UiStack};

/// Name of the structured plan file in a project plan directory.
pub const STRUCTURED_PLAN_FILE: &str = "plan.json";

/// Name of the textual plan file in a project plan directory.
pub const TEXTUAL_PLAN_FILE: &str = "plan.txt";

/// Builds the report of a pull request.
#[derive(Debug)]
pub struct PullConverter<'a> {
    /// Settings.
    settings: &'a Settings,
    /// Scanner wording.
    scan_options: ScanOptions,
}

impl<'a> PullConverter<'a> {
    /// Creates a converter.
    #[must_use]
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            scan_options: settings.scan.options(),
        }
    }

    /// Converts every project of the pull.
    ///
    /// # Errors
    ///
    /// Returns the first project failure when `fail_fast` is set. Otherwise
    /// failures are recorded on the affected stack and this never fails.
    pub fn convert(
        &self,
        pull: &PullStatus,
        locks: &HashMap<String, ProjectLock>,
        log_urls: &HashMap<String, String>,
    ) -> Result<UiData> {
        info!(
            "Converting {}#{} ({} projects)",
            pull.pull.base_repo.full_name,
            pull.pull.num,
            pull.projects.len()
        );

        let stacks = pull
            .projects
            .iter()
            .map(|project| self.convert_stack(pull, project, locks, log_urls))
            .collect::<Result<Vec<_>>>()?;

        Ok(UiData {
            executable_name: self.settings.atlantis.executable_name.clone(),
            pr_repo: pull.pull.base_repo.full_name.clone(),
            pr_num: pull.pull.num,
            pr_url: pull.pull.url.clone(),
            stacks,
        })
    }

    fn convert_stack(
        &self,
        pull: &PullStatus,
        project: &ProjectStatus,
        locks: &HashMap<String, ProjectLock>,
        log_urls: &HashMap<String, String>,
    ) -> Result<UiStack> {
        let mut stack = UiStack {
            name: project.project_name.clone(),
            path: project.repo_rel_dir.clone(),
            log_url: log_urls
                .get(&project.log_key(&pull.pull))
                .cloned()
                .unwrap_or_default(),
            ..UiStack::default()
        };

        // Covers both failed plans and plans refused because of a lock.
        if project.status == PlanStatus::Errored {
            stack.plan_error = true;
            self.attach_foreign_lock(&mut stack, pull, project, locks);
            return Ok(stack);
        }

        if !project.status.is_planned() {
            warn!(
                "Unexpected status {} for project {}, reading latest plan anyway",
                project.status, project.repo_rel_dir
            );
        }

        let plan_dir = self.settings.project_plan_dir(
            &pull.pull.base_repo.full_name,
            pull.pull.num,
            &project.repo_rel_dir,
        );

        match correlate_files(
            plan_dir.join(STRUCTURED_PLAN_FILE),
            plan_dir.join(TEXTUAL_PLAN_FILE),
            &self.scan_options,
        ) {
            Ok(diffs) => {
                debug!("Project {}: {diffs}", project.repo_rel_dir);
                stack.diffs = diffs;
            }
            Err(e) if self.settings.fail_fast => return Err(e),
            Err(e) => {
                warn!("Failed to convert project {}: {e}", project.repo_rel_dir);
                stack.plan_error = true;
                stack.conversion_error = Some(e.to_string());
            }
        }

        Ok(stack)
    }

    fn attach_foreign_lock(
        &self,
        stack: &mut UiStack,
        pull: &PullStatus,
        project: &ProjectStatus,
        locks: &HashMap<String, ProjectLock>,
    ) {
        let lock_id = project.lock_id(&pull.pull.base_repo.full_name);
        let Some(lock) = locks.get(&lock_id) else {
            return;
        };
        if lock.pull.same_pull(&pull.pull) {
            return;
        }

        debug!("Project {} is locked by #{}", project.repo_rel_dir, lock.pull.num);
        let escaped: String = url::form_urlencoded::byte_serialize(lock_id.as_bytes()).collect();
        stack.lock_url = Some(format!("{}/lock?id={escaped}", self.settings.atlantis.url));
        stack.lock_pr_url = Some(lock.pull.url.clone());
        stack.lock_pr_author = Some(lock.pull.author.clone());
    }
}

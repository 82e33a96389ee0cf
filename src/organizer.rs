/// One-pass orchestration: walk the spreadsheet groups, resolve each
/// group's folder path, move matched photos into numbered sequence folders
/// and record per-row counters. No state survives between runs and partial
/// moves are never rolled back.
use crate::drive::{DriveApi, DriveClient, EntryKind};
use crate::error::Result;
use crate::sheet::Sheet;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct RunReport {
    pub groups: usize,
    pub rows: usize,
    pub photos_moved: usize,
    /// Group keys whose locality/team/group folder path could not be
    /// resolved; their rows are left untouched.
    pub skipped_groups: Vec<String>,
    /// Photos found under a group folder after its rows were processed,
    /// i.e. never claimed by any sequence interval.
    pub unsequenced: Vec<String>,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} groups, {} rows, {} photos moved, {} groups skipped, {} photos without sequence",
            self.groups,
            self.rows,
            self.photos_moved,
            self.skipped_groups.len(),
            self.unsequenced.len()
        )
    }
}

pub async fn organize<A: DriveApi>(
    client: &DriveClient<A>,
    sheet: &mut Sheet,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    // Destination folders are numbered by a single counter across all
    // groups, so sequence numbers are unique for the whole run.
    let mut sequence_number: u32 = 1;

    for (group_key, row_indexes) in sheet.groups() {
        report.groups += 1;
        let first_row = row_indexes[0];
        let (locality, team) = sheet.locality_team(first_row)?;

        let group_id = match resolve_group_folder(client, &locality, &team, &group_key).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(
                    "skipping group '{}': folder path {}/{}/{} not found",
                    group_key, locality, team, group_key
                );
                report.skipped_groups.push(group_key);
                continue;
            }
            Err(e) => {
                warn!(
                    "skipping group '{}': folder path {}/{}/{} could not be resolved: {}",
                    group_key, locality, team, group_key, e
                );
                report.skipped_groups.push(group_key);
                continue;
            }
        };
        info!("{} - {} - {}", locality, team, group_key);

        for index in row_indexes {
            report.rows += 1;
            let range = sheet.photo_range(index)?;
            let sequence_label = sheet.sequence(index).to_string();

            let dest_id = client
                .create_folder(&sequence_number.to_string(), &group_id, true)
                .await?;

            let mut moved: u32 = 0;
            for photo in range {
                let name = photo.to_string();
                let photo_id = match client
                    .resolve_id(&name, EntryKind::Photo, Some(&group_id))
                    .await
                {
                    Ok(Some(id)) => id,
                    Ok(None) => {
                        warn!(
                            "photo '{}' not found under {}/{}/{} (sequence '{}')",
                            name, locality, team, group_key, sequence_label
                        );
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            "lookup for photo '{}' under {}/{}/{} failed: {}",
                            name, locality, team, group_key, e
                        );
                        continue;
                    }
                };

                match client.move_entry(&photo_id, &group_id, &dest_id).await {
                    Ok(_) => {
                        moved += 1;
                        report.photos_moved += 1;
                    }
                    Err(e) => {
                        warn!(
                            "failed to move photo '{}' in {}/{}/{}: {}",
                            name, locality, team, group_key, e
                        );
                    }
                }
            }

            sheet.set_outputs(index, moved, sequence_number);
            sequence_number += 1;
        }

        // Anything still sitting directly under the group folder was never
        // claimed by a sequence interval. A failed sweep listing only costs
        // the warnings, never the row statistics already recorded.
        match client.list_photos_under(&group_id).await {
            Ok(leftovers) => {
                for leftover in leftovers {
                    warn!(
                        "photo '{}' under {}/{}/{} has no sequence assigned",
                        leftover.name, locality, team, group_key
                    );
                    report.unsequenced.push(leftover.name);
                }
            }
            Err(e) => {
                warn!(
                    "could not list leftover photos under {}/{}/{}: {}",
                    locality, team, group_key, e
                );
            }
        }
    }

    Ok(report)
}

/// Resolve the 3-level folder path locality -> team -> group key. Levels
/// are looked up, never created: photos to be sorted can only live in a
/// pre-existing group folder, so a missing level skips the whole group.
async fn resolve_group_folder<A: DriveApi>(
    client: &DriveClient<A>,
    locality: &str,
    team: &str,
    group_key: &str,
) -> Result<Option<String>> {
    let Some(locality_id) = client.resolve_id(locality, EntryKind::Folder, None).await? else {
        return Ok(None);
    };
    let Some(team_id) = client
        .resolve_id(team, EntryKind::Folder, Some(&locality_id))
        .await?
    else {
        return Ok(None);
    };
    client
        .resolve_id(group_key, EntryKind::Folder, Some(&team_id))
        .await
}

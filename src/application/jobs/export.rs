//! Hierarchy export job.
//!
//! Snapshots the full menu tree and writes it as a CSV spreadsheet under
//! the media directory. The snapshot reads whatever is committed at query
//! time; mutations racing the export are not coordinated with it.

use std::path::{Path, PathBuf};

use apalis::prelude::{Data, Error as ApalisError};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::application::export::write_export_file;
use crate::application::repos::{JobsRepo, MenuExportNode, RepoError};
use crate::domain::types::JobType;

use super::context::{JobWorkerContext, job_failed};
use super::queue::enqueue_job;

const EXPORT_JOB_MAX_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportHierarchyJobPayload {
    /// Names the output file; generated before the job id exists.
    pub export_id: Uuid,
}

pub async fn enqueue_export_job<J: JobsRepo + ?Sized>(repo: &J) -> Result<String, RepoError> {
    let payload = ExportHierarchyJobPayload {
        export_id: Uuid::new_v4(),
    };
    enqueue_job(
        repo,
        JobType::ExportHierarchy,
        &payload,
        None,
        EXPORT_JOB_MAX_ATTEMPTS,
    )
    .await
}

pub fn export_file_path(media_dir: &Path, export_id: Uuid) -> PathBuf {
    media_dir.join(format!("{export_id}_hierarchy_export.csv"))
}

pub async fn process_export_job(
    payload: ExportHierarchyJobPayload,
    context: Data<JobWorkerContext>,
) -> Result<(), ApalisError> {
    let ctx = &*context;
    let path = export_file_path(&ctx.media_dir, payload.export_id);

    write_export_file(ctx.repositories.as_ref(), &path)
        .await
        .map_err(job_failed)?;

    info!(
        target = "application::jobs::process_export_job",
        export_id = %payload.export_id,
        path = %path.display(),
        "hierarchy exported"
    );

    Ok(())
}

fn push_csv_field(row: &mut String, field: &str) {
    if !row.is_empty() {
        row.push(',');
    }
    if field.contains([',', '"', '\n', '\r']) {
        row.push('"');
        row.push_str(&field.replace('"', "\"\""));
        row.push('"');
    } else {
        row.push_str(field);
    }
}

fn push_csv_row(out: &mut String, fields: &[&str]) {
    let mut row = String::new();
    for field in fields {
        push_csv_field(&mut row, field);
    }
    out.push_str(&row);
    out.push('\n');
}

/// Render the hierarchy snapshot as CSV rows.
///
/// Menus number from 1 in the first column; submenu rows indent by one
/// column, dish rows by two, carrying the dish price last.
pub fn render_csv(menus: &[MenuExportNode]) -> String {
    let mut out = String::new();

    for (menu_index, menu) in menus.iter().enumerate() {
        let menu_number = (menu_index + 1).to_string();
        push_csv_row(&mut out, &[&menu_number, &menu.title, &menu.description]);

        for (submenu_index, submenu) in menu.submenus.iter().enumerate() {
            let submenu_number = (submenu_index + 1).to_string();
            push_csv_row(
                &mut out,
                &["", &submenu_number, &submenu.title, &submenu.description],
            );

            for (dish_index, dish) in submenu.dishes.iter().enumerate() {
                let dish_number = (dish_index + 1).to_string();
                let price = dish.price.to_string();
                push_csv_row(
                    &mut out,
                    &[
                        "",
                        "",
                        &dish_number,
                        &dish.title,
                        &dish.description,
                        &price,
                    ],
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use crate::application::repos::{DishExportNode, SubmenuExportNode};
    use crate::domain::price::Price;

    use super::*;

    fn sample_tree() -> Vec<MenuExportNode> {
        vec![MenuExportNode {
            title: "Main menu".to_string(),
            description: "Classics".to_string(),
            submenus: vec![SubmenuExportNode {
                title: "Soups".to_string(),
                description: "Served hot".to_string(),
                dishes: vec![DishExportNode {
                    title: "Borscht".to_string(),
                    description: "Beetroot".to_string(),
                    price: Price::from_minor_units(25150),
                }],
            }],
        }]
    }

    #[test]
    fn rows_indent_per_hierarchy_level() {
        let csv = render_csv(&sample_tree());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "1,Main menu,Classics");
        assert_eq!(lines[1], ",1,Soups,Served hot");
        assert_eq!(lines[2], ",,1,Borscht,Beetroot,251.50");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_hierarchy_renders_no_rows() {
        assert_eq!(render_csv(&[]), "");
    }

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let menus = vec![MenuExportNode {
            title: "Soups, stews".to_string(),
            description: "The \"good\" stuff".to_string(),
            submenus: Vec::new(),
        }];
        let csv = render_csv(&menus);

        assert_eq!(
            csv.lines().next().expect("one row"),
            "1,\"Soups, stews\",\"The \"\"good\"\" stuff\""
        );
    }

    #[test]
    fn numbering_restarts_per_parent() {
        let mut menus = sample_tree();
        menus.push(menus[0].clone());
        let csv = render_csv(&menus);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[3], "2,Main menu,Classics");
        assert_eq!(lines[4], ",1,Soups,Served hot");
    }

    #[test]
    fn export_path_carries_the_export_id() {
        let export_id = Uuid::nil();
        let path = export_file_path(Path::new("/var/media"), export_id);
        assert_eq!(
            path.to_str().expect("utf-8 path"),
            "/var/media/00000000-0000-0000-0000-000000000000_hierarchy_export.csv"
        );
    }
}

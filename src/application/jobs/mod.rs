mod context;
mod export;
mod queue;

pub use context::{JobWorkerContext, job_failed};
pub use export::{
    ExportHierarchyJobPayload, enqueue_export_job, export_file_path, process_export_job,
    render_csv,
};
pub use queue::enqueue_job;

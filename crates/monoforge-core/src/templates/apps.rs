//! App entry stubs: the BullMQ worker and generic Node services

use super::{RenderFail, TemplateParams};

pub(super) fn worker_index(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    Ok("\
import { Worker } from \"bullmq\";
import { connection, QUEUE_NAMES } from \"@repo/queue\";

const worker = new Worker(
  QUEUE_NAMES.default,
  async (job) => {
    console.log(`processing job ${job.id} (${job.name})`);
  },
  { connection }
);

worker.on(\"completed\", (job) => console.log(`job ${job.id} completed`));
worker.on(\"failed\", (job, err) => console.error(`job ${job?.id} failed:`, err));
"
    .to_string())
}

pub(super) fn node_index(params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let name = params.require("name")?;
    Ok(format!(
        "\
async function main(): Promise<void> {{
  console.log(\"{name} started\");
}}

main().catch((err) => {{
  console.error(err);
  process.exit(1);
}});
"
    ))
}

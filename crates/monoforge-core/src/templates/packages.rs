//! Shared-package artifacts: manifests, tsconfig bases, lint config,
//! Prisma schema, queue wiring, docker-compose services

use super::{pretty_json, string_map, verified_yaml, RenderFail, TemplateParams};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Generated package.json for workspace packages and apps. Field order is
/// the declaration order below.
#[derive(Debug, Serialize)]
struct PackageManifest<'a> {
    name: &'a str,
    version: &'static str,
    private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    main: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    scripts: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    dependencies: BTreeMap<String, String>,
    #[serde(rename = "devDependencies", skip_serializing_if = "BTreeMap::is_empty")]
    dev_dependencies: BTreeMap<String, String>,
}

pub(super) fn manifest(params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let manifest = PackageManifest {
        name: params.require("name")?,
        version: "0.0.0",
        private: true,
        main: params.get("main"),
        scripts: string_map(params, "scripts")?,
        dependencies: string_map(params, "dependencies")?,
        dev_dependencies: string_map(params, "dev_dependencies")?,
    };
    Ok(pretty_json(&manifest))
}

pub(super) fn tsconfig(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let value = json!({
        "extends": "@repo/typescript-config/node.json",
        "compilerOptions": {
            "outDir": "dist"
        },
        "include": ["src"]
    });
    Ok(pretty_json(&value))
}

pub(super) fn tsconfig_base(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let value = json!({
        "$schema": "https://json.schemastore.org/tsconfig",
        "compilerOptions": {
            "target": "ES2022",
            "module": "NodeNext",
            "moduleResolution": "NodeNext",
            "strict": true,
            "esModuleInterop": true,
            "skipLibCheck": true,
            "forceConsistentCasingInFileNames": true,
            "isolatedModules": true,
            "declaration": true,
            "declarationMap": true
        }
    });
    Ok(pretty_json(&value))
}

pub(super) fn tsconfig_node(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let value = json!({
        "$schema": "https://json.schemastore.org/tsconfig",
        "extends": "./base.json",
        "compilerOptions": {
            "lib": ["ES2022"],
            "types": ["node"]
        }
    });
    Ok(pretty_json(&value))
}

pub(super) fn eslint_index(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    Ok("\
/** Shared ESLint config for the workspace. */
module.exports = {
  root: false,
  env: { node: true, es2022: true },
  extends: [\"eslint:recommended\"],
  parserOptions: { ecmaVersion: \"latest\", sourceType: \"module\" },
  ignorePatterns: [\"dist/\", \".next/\", \"node_modules/\"],
};
"
    .to_string())
}

pub(super) fn prisma_schema(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    Ok("\
generator client {
  provider = \"prisma-client-js\"
}

datasource db {
  provider = \"postgresql\"
  url      = env(\"DATABASE_URL\")
}
"
    .to_string())
}

pub(super) fn db_index(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    Ok("\
import { PrismaClient } from \"@prisma/client\";

const globalForPrisma = globalThis as { prisma?: PrismaClient };

export const prisma = globalForPrisma.prisma ?? new PrismaClient();

if (process.env.NODE_ENV !== \"production\") {
  globalForPrisma.prisma = prisma;
}

export * from \"@prisma/client\";
"
    .to_string())
}

pub(super) fn queue_index(_params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    Ok("\
import { Queue } from \"bullmq\";
import { Redis } from \"ioredis\";

export const connection = new Redis(process.env.REDIS_URL ?? \"redis://localhost:6379\", {
  maxRetriesPerRequest: null,
});

export const QUEUE_NAMES = {
  default: \"default\",
} as const;

export function createQueue(name: string): Queue {
  return new Queue(name, { connection });
}
"
    .to_string())
}

pub(super) fn compose_yml(params: &TemplateParams) -> std::result::Result<String, RenderFail> {
    let db_name = params.require("db_name")?;
    verified_yaml(format!(
        "\
services:
  postgres:
    image: postgres:16-alpine
    restart: unless-stopped
    environment:
      POSTGRES_USER: postgres
      POSTGRES_PASSWORD: postgres
      POSTGRES_DB: {db_name}
    ports:
      - \"5432:5432\"
    volumes:
      - pgdata:/var/lib/postgresql/data
  redis:
    image: redis:7-alpine
    restart: unless-stopped
    ports:
      - \"6379:6379\"

volumes:
  pgdata:
"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_renders_scoped_name_and_scripts() {
        let params = TemplateParams::new()
            .with("name", "@repo/db")
            .with("scripts", r#"{"db:generate":"prisma generate"}"#)
            .with("dependencies", r#"{"@prisma/client":"^5.14.0"}"#)
            .with("main", "./src/index.ts");

        let text = manifest(&params).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "@repo/db");
        assert_eq!(value["private"], true);
        assert_eq!(value["main"], "./src/index.ts");
        assert_eq!(value["scripts"]["db:generate"], "prisma generate");
        assert_eq!(value["dependencies"]["@prisma/client"], "^5.14.0");
    }

    #[test]
    fn test_manifest_omits_empty_sections() {
        let text = manifest(&TemplateParams::new().with("name", "@repo/bare")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("scripts").is_none());
        assert!(value.get("dependencies").is_none());
        assert!(value.get("devDependencies").is_none());
        assert!(value.get("main").is_none());
    }

    #[test]
    fn test_manifest_rejects_malformed_scripts() {
        let params = TemplateParams::new()
            .with("name", "@repo/broken")
            .with("scripts", "not-json");
        assert_eq!(manifest(&params).unwrap_err(), RenderFail::Invalid("scripts"));
    }

    #[test]
    fn test_compose_services_and_ports() {
        let text = compose_yml(&TemplateParams::new().with("db_name", "demo_app_dev")).unwrap();
        assert!(text.contains("POSTGRES_DB: demo_app_dev"));
        assert!(text.contains("\"5432:5432\""));
        assert!(text.contains("\"6379:6379\""));

        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert!(value["services"]["postgres"].is_mapping());
        assert!(value["services"]["redis"].is_mapping());
        assert_eq!(
            value["services"]["postgres"]["environment"]["POSTGRES_DB"],
            "demo_app_dev"
        );
    }

    #[test]
    fn test_tsconfig_extends_shared_base() {
        let text = tsconfig(&TemplateParams::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["extends"], "@repo/typescript-config/node.json");
    }

    #[test]
    fn test_prisma_schema_uses_database_url() {
        let text = prisma_schema(&TemplateParams::new()).unwrap();
        assert!(text.contains("provider = \"postgresql\""));
        assert!(text.contains("env(\"DATABASE_URL\")"));
    }
}

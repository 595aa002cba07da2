//! Spec preprocessing.
//!
//! Runs before any resolution: derives package and module names from the API
//! title, computes the base URL, resolves security schemes and collects the
//! supporting files enabled by the current options.

use url::Url;

use crate::core::error::Result;
use crate::core::utils::{lower_first, split_words, upper_first};
use crate::generation::context::RunContext;
use crate::generation::model::{CodegenSecurity, SupportingFile};
use crate::generation::sanitizers::escape_text;
use crate::generation::security::resolve_security;
use crate::generation::types::{DiagnosticKind, FilePlan, FileScope};
use crate::infrastructure::openapi::ApiSpec;

/// Base URL used when the document declares no usable server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

const DEFAULT_TITLE: &str = "Swagger";

/// Names derived from the API title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiNames {
    /// `SwaggerPetstore`
    pub api_name: String,
    /// `swaggerPetstore`
    pub title_lower: String,
    /// `swagger-petstore`
    pub package: String,
    /// `swagger_petstore`
    pub paths_name: String,
}

impl ApiNames {
    pub fn from_title(title: &str) -> Self {
        let trimmed = title.trim();
        let cut = trimmed.len().saturating_sub(3);
        let stripped = match trimmed.get(cut..) {
            Some(tail) if tail.eq_ignore_ascii_case("api") => &trimmed[..cut],
            _ => trimmed,
        };

        let mut words = split_words(stripped);
        if words.is_empty() {
            words.push(DEFAULT_TITLE.to_string());
        }

        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let api_name: String = words.iter().map(|w| upper_first(w)).collect();
        Self {
            title_lower: lower_first(&api_name),
            package: lower.join("-"),
            paths_name: lower.join("_"),
            api_name,
        }
    }
}

/// Server location split into template-friendly parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    pub scheme: String,
    pub host: String,
    pub base_path: String,
}

impl BaseUrl {
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.base_path)
    }
}

/// Interpret the first server URL, falling back to [`DEFAULT_BASE_URL`]
pub fn base_url(ctx: &mut RunContext, spec: &ApiSpec) -> BaseUrl {
    let raw = spec
        .servers
        .first()
        .map(|s| s.url.trim())
        .unwrap_or_default();

    let parsed = match raw {
        "" | "/" => Url::parse(DEFAULT_BASE_URL),
        relative if relative.starts_with('/') => {
            Url::parse(DEFAULT_BASE_URL).and_then(|base| base.join(relative))
        }
        absolute if absolute.contains("://") => Url::parse(absolute),
        bare => Url::parse(&format!("https://{bare}")),
    };

    let url = match parsed {
        Ok(url) if url.host_str().is_some() => url,
        other => {
            let reason = other.err().map(|e| e.to_string()).unwrap_or_else(|| "no host".to_string());
            ctx.warn(
                DiagnosticKind::Unsupported,
                "servers",
                format!("invalid server URL '{raw}' ({reason}), using {DEFAULT_BASE_URL}"),
            );
            return BaseUrl {
                scheme: "http".to_string(),
                host: "localhost:8080".to_string(),
                base_path: String::new(),
            };
        }
    };

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    BaseUrl {
        scheme: url.scheme().to_string(),
        host,
        base_path: url.path().trim_end_matches('/').to_string(),
    }
}

/// Fill the run's globals and supporting files; returns the resolved security schemes
pub fn preprocess(
    ctx: &mut RunContext,
    spec: &ApiSpec,
    plan: &[FilePlan],
) -> Result<Vec<CodegenSecurity>> {
    let title = if spec.info.title.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        spec.info.title.as_str()
    };
    let names = ApiNames::from_title(title);
    tracing::debug!(api_name = %names.api_name, package = %names.package, "Derived API names");

    ctx.set_global("target", ctx.strategy.target.as_str());
    ctx.set_global("target_name", ctx.strategy.target.display_name());
    ctx.set_global("title", &names.api_name);
    ctx.set_global("title_lower", &names.title_lower);
    ctx.set_global("api_name", &names.api_name);
    ctx.set_global("package", &names.package);
    ctx.set_global("paths_name", &names.paths_name);
    ctx.set_global("request_type", format!("{}Request", names.api_name));
    ctx.set_global("config_type", format!("{}Config", names.api_name));
    ctx.set_global("spec_version", &spec.openapi);
    ctx.set_global("app_version", &spec.info.version);
    let description = spec
        .info
        .description
        .as_deref()
        .map(|d| escape_text(d, &ctx.strategy.unsafe_text));
    ctx.set_global("app_description", description);

    let base = base_url(ctx, spec);
    ctx.set_global("base_url", base.url());
    ctx.set_global("scheme", &base.scheme);
    ctx.set_global("host", &base.host);
    ctx.set_global("base_path", &base.base_path);

    let spec_yaml = match &spec.source {
        Some(source) => serde_yaml::to_string(source)?,
        None => serde_yaml::to_string(spec)?,
    };
    ctx.set_global("spec_yaml", spec_yaml);

    let options: Vec<(String, serde_json::Value)> = ctx
        .options
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    for (name, value) in options {
        ctx.globals.insert(name, value);
    }
    let date_format = ctx.options.string("dateFormat").map(str::to_string);
    let date_time_format = ctx.options.string("dateTimeFormat").map(str::to_string);
    ctx.set_global("date_format", date_format);
    ctx.set_global("date_time_format", date_time_format);
    if !ctx.options.flag("hideGenerationTimestamp") {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        ctx.set_global("generated_date", now);
    }

    let security = resolve_security(ctx, &spec.components.security_schemes)?;
    ctx.set_global("auth_methods", &security);

    for file in plan.iter().filter(|f| f.scope == FileScope::None) {
        if file.is_enabled(&ctx.options) {
            ctx.supporting_files.push(SupportingFile::new(
                file.template.as_str(),
                file.folder.as_str(),
                file.filename.as_str(),
            ));
        } else {
            tracing::debug!(template = %file.template, "Supporting file disabled by options");
        }
    }

    tracing::info!(
        supporting_files = ctx.supporting_files.len(),
        security_schemes = security.len(),
        "Preprocessed spec"
    );
    Ok(security)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GeneratorConfig, common_options};
    use crate::generation::types::Target;
    use crate::infrastructure::strategies;
    use serde_json::json;
    use std::sync::Arc;

    fn context(defines: &[&str]) -> RunContext {
        let strategy = strategies::strategy_for(Target::Haskell);
        let mut declared = common_options();
        declared.extend(strategy.options.clone());
        let mut config = GeneratorConfig::default();
        for define in defines {
            config.apply_define(define).unwrap();
        }
        RunContext::new(Arc::new(strategy), config.resolve_options(&declared).unwrap())
    }

    fn spec(yaml: &str) -> ApiSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_names_from_title() {
        let names = ApiNames::from_title("Swagger Petstore API");
        assert_eq!(names.api_name, "SwaggerPetstore");
        assert_eq!(names.title_lower, "swaggerPetstore");
        assert_eq!(names.package, "swagger-petstore");
        assert_eq!(names.paths_name, "swagger_petstore");

        assert_eq!(ApiNames::from_title("Api").api_name, "Swagger");
        assert_eq!(ApiNames::from_title("my-service").package, "my-service");
    }

    #[test]
    fn test_base_url_variants() {
        let mut ctx = context(&[]);

        let missing = base_url(&mut ctx, &spec("openapi: 3.0.0"));
        assert_eq!(missing.url(), "http://localhost:8080");

        let absolute = base_url(&mut ctx, &spec("servers: [{ url: 'https://api.example.com:8443/v2/' }]"));
        assert_eq!(absolute.scheme, "https");
        assert_eq!(absolute.host, "api.example.com:8443");
        assert_eq!(absolute.base_path, "/v2");

        let relative = base_url(&mut ctx, &spec("servers: [{ url: /v1 }]"));
        assert_eq!(relative.url(), "http://localhost:8080/v1");

        let bare = base_url(&mut ctx, &spec("servers: [{ url: petstore.io/api }]"));
        assert_eq!(bare.url(), "https://petstore.io/api");
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_server_url_warns() {
        let mut ctx = context(&[]);
        let base = base_url(&mut ctx, &spec("servers: [{ url: 'http://' }]"));
        assert_eq!(base.host, "localhost:8080");
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn test_globals_and_supporting_files() {
        let mut ctx = context(&["generateLenses=false", "customFlag=on"]);
        let plan = vec![
            FilePlan {
                template: "Model.hs".to_string(),
                folder: "lib/{{ api_name }}".to_string(),
                filename: "Model.hs".to_string(),
                scope: FileScope::None,
                when: vec![],
                context: serde_json::Value::Null,
            },
            FilePlan {
                template: "ModelLens.hs".to_string(),
                folder: "lib/{{ api_name }}".to_string(),
                filename: "ModelLens.hs".to_string(),
                scope: FileScope::None,
                when: vec!["generateLenses".to_string()],
                context: serde_json::Value::Null,
            },
            FilePlan {
                template: "Api.hs".to_string(),
                folder: "lib".to_string(),
                filename: "{{ tag }}.hs".to_string(),
                scope: FileScope::Api,
                when: vec![],
                context: serde_json::Value::Null,
            },
        ];
        let doc = spec(
            r#"
openapi: 3.0.1
info: { title: Swagger Petstore, version: 1.0.0 }
components:
  securitySchemes:
    api_key: { type: apiKey, name: api_key, in: header }
"#,
        );

        let security = preprocess(&mut ctx, &doc, &plan).unwrap();

        assert_eq!(security.len(), 1);
        assert_eq!(ctx.globals["title"], json!("SwaggerPetstore"));
        assert_eq!(ctx.globals["request_type"], json!("SwaggerPetstoreRequest"));
        assert_eq!(ctx.globals["spec_version"], json!("3.0.1"));
        assert_eq!(ctx.globals["generateLenses"], json!(false));
        assert_eq!(ctx.globals["customFlag"], json!("on"));
        assert_eq!(ctx.globals["date_format"], json!("%Y-%m-%d"));
        assert!(!ctx.globals.contains_key("generated_date"));
        assert!(ctx.globals["spec_yaml"].as_str().unwrap().contains("Swagger Petstore"));

        assert_eq!(ctx.supporting_files.len(), 1);
        assert_eq!(ctx.supporting_files[0].template_ref, "Model.hs");
    }
}

//! Security scheme resolution

use indexmap::IndexMap;

use crate::core::error::Result;
use crate::generation::context::RunContext;
use crate::generation::model::{CodegenSecurity, SecurityKind, SecurityScope};
use crate::generation::naming::Role;
use crate::generation::registry::RecordKind;
use crate::generation::sanitizers::escape_text;
use crate::generation::types::DiagnosticKind;
use crate::infrastructure::openapi::SecuritySchemeNode;

/// Resolve every declared security scheme, skipping unsupported ones
pub fn resolve_security(
    ctx: &mut RunContext,
    schemes: &IndexMap<String, SecuritySchemeNode>,
) -> Result<Vec<CodegenSecurity>> {
    let mut resolved = Vec::with_capacity(schemes.len());

    for (key, node) in schemes {
        let Some(kind) = scheme_kind(node) else {
            ctx.warn(
                DiagnosticKind::Unsupported,
                key.as_str(),
                format!(
                    "security scheme type '{}' is not supported, skipped",
                    describe(node)
                ),
            );
            continue;
        };

        let prefixes = &ctx.strategy.security_prefixes;
        let prefix = match kind {
            SecurityKind::Basic => prefixes.basic,
            SecurityKind::Bearer => prefixes.bearer,
            SecurityKind::ApiKey => prefixes.api_key,
            SecurityKind::OAuth2 => prefixes.oauth,
        };
        let candidate = format!(
            "{prefix}{}",
            ctx.allocator.allocate(key, Role::Type, Some(""))
        );
        let name = ctx
            .registry
            .reserve_unique(&candidate, key, RecordKind::Security)?;

        let mut scopes: Vec<SecurityScope> = Vec::new();
        for flow in node.flows.values() {
            for (scope, description) in &flow.scopes {
                if !scopes.iter().any(|s| &s.scope == scope) {
                    scopes.push(SecurityScope {
                        scope: scope.clone(),
                        description: escape_text(description, &ctx.strategy.unsafe_text),
                    });
                }
            }
        }

        tracing::debug!(scheme = %key, name = %name, kind = ?kind, "Resolved security scheme");
        resolved.push(CodegenSecurity {
            name,
            key: key.clone(),
            kind,
            key_param_name: node.name.clone().filter(|_| kind == SecurityKind::ApiKey),
            key_in: node.location.clone().filter(|_| kind == SecurityKind::ApiKey),
            scopes,
            description: node
                .description
                .as_deref()
                .map(|d| escape_text(d, &ctx.strategy.unsafe_text)),
            vendor_extensions: IndexMap::new(),
        });
    }

    Ok(resolved)
}

fn scheme_kind(node: &SecuritySchemeNode) -> Option<SecurityKind> {
    match node.scheme_type.as_str() {
        "apiKey" => Some(SecurityKind::ApiKey),
        "oauth2" => Some(SecurityKind::OAuth2),
        // swagger 2 spelling
        "basic" => Some(SecurityKind::Basic),
        "http" => match node.scheme.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("basic") => Some(SecurityKind::Basic),
            Some("bearer") => Some(SecurityKind::Bearer),
            _ => None,
        },
        _ => None,
    }
}

fn describe(node: &SecuritySchemeNode) -> String {
    match &node.scheme {
        Some(scheme) => format!("{} {scheme}", node.scheme_type),
        None => node.scheme_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GeneratorConfig, common_options};
    use crate::generation::types::Target;
    use crate::infrastructure::strategies;
    use std::sync::Arc;

    fn context() -> RunContext {
        let options = GeneratorConfig::default()
            .resolve_options(&common_options())
            .unwrap();
        RunContext::new(Arc::new(strategies::strategy_for(Target::Haskell)), options)
    }

    #[test]
    fn test_scheme_names_carry_family_prefix() {
        let schemes: IndexMap<String, SecuritySchemeNode> = serde_yaml::from_str(
            r#"
api_key: { type: apiKey, name: X-API-KEY, in: header }
petstore_auth:
  type: oauth2
  flows:
    implicit:
      authorizationUrl: https://example.com/auth
      scopes: { "write:pets": modify pets, "read:pets": read pets }
basic: { type: http, scheme: basic }
"#,
        )
        .unwrap();
        let mut ctx = context();
        let resolved = resolve_security(&mut ctx, &schemes).unwrap();
        let names: Vec<&str> = resolved.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, ["AuthApiKeyApiKey", "AuthOAuthPetstoreAuth", "AuthBasicBasic"]);
        assert_eq!(resolved[0].key_param_name.as_deref(), Some("X-API-KEY"));
        assert_eq!(resolved[0].key_in.as_deref(), Some("header"));
        assert_eq!(resolved[1].scopes.len(), 2);
        assert_eq!(resolved[1].scopes[0].scope, "write:pets");
        assert_eq!(resolved[2].key_param_name, None);
    }

    #[test]
    fn test_unsupported_scheme_is_skipped_with_warning() {
        let schemes: IndexMap<String, SecuritySchemeNode> =
            serde_yaml::from_str("oidc: { type: openIdConnect }").unwrap();
        let mut ctx = context();
        let resolved = resolve_security(&mut ctx, &schemes).unwrap();

        assert!(resolved.is_empty());
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::Unsupported);
    }
}

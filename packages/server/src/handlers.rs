//! HTTP handler functions for the fish census API.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use fishcensus_analytics_models::MunicipalitySummary;
use fishcensus_database::queries;
use fishcensus_export::CommunityReport;
use fishcensus_import::ImportOptions;
use fishcensus_models::RecordKind;
use fishcensus_server_models::{
    ApiCensusPoint, ApiCommunity, ApiCommunityDetail, ApiDemographic, ApiEnvironment, ApiHealth,
    ApiMunicipality, ApiMunicipalitySummary, CreateEnvironmentRequest, LinkEnvironmentRequest,
};
use futures::StreamExt as _;

use crate::AppState;
use crate::auth::AuthClaims;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/municipalities`
pub async fn municipalities(state: web::Data<AppState>) -> HttpResponse {
    match queries::list_municipalities(state.db.as_ref()).await {
        Ok(rows) => {
            let out: Vec<ApiMunicipality> = rows.into_iter().map(ApiMunicipality::from).collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => {
            log::error!("Failed to list municipalities: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/municipalities/{id}/communities`
///
/// 404 when the municipality does not exist; an existing municipality
/// with no communities returns an empty list.
pub async fn municipality_communities(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let municipality_id = path.into_inner();

    match queries::get_municipality(state.db.as_ref(), municipality_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Municipality not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to fetch municipality {municipality_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    }

    match queries::list_communities(state.db.as_ref(), municipality_id).await {
        Ok(rows) => {
            let out: Vec<ApiCommunity> = rows.into_iter().map(ApiCommunity::from).collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => {
            log::error!("Failed to list communities for municipality {municipality_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/municipalities/{id}/summary`
pub async fn municipality_summary(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let municipality_id = path.into_inner();

    let municipality =
        match queries::get_municipality(state.db.as_ref(), municipality_id).await {
            Ok(Some(m)) => m,
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Municipality not found"
                }));
            }
            Err(e) => {
                log::error!("Failed to fetch municipality {municipality_id}: {e}");
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": e.to_string()
                }));
            }
        };

    match queries::latest_census_by_community(state.db.as_ref(), Some(municipality_id)).await {
        Ok(rows) => {
            let summary = fishcensus_analytics::summary_by_municipality(&rows)
                .into_iter()
                .next()
                .unwrap_or(MunicipalitySummary {
                    municipality: municipality.name,
                    community_count: 0,
                    total_people: 0,
                    total_fishermen: 0,
                    total_families: 0,
                });
            HttpResponse::Ok().json(ApiMunicipalitySummary::from(summary))
        }
        Err(e) => {
            log::error!("Failed to summarize municipality {municipality_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/communities/{id}`
pub async fn community_detail(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let community_id = path.into_inner();

    let localities = match queries::list_localities(state.db.as_ref(), community_id).await {
        Ok(rows) => rows.into_iter().map(|l| l.name).collect(),
        Err(e) => {
            log::error!("Failed to list localities for community {community_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    match build_report(&state, community_id).await {
        Ok(Some(report)) => {
            let detail = ApiCommunityDetail {
                community: ApiCommunity::from(report.community),
                municipality: report.municipality,
                latest_census: report.latest_census.map(ApiCensusPoint::from),
                localities,
                demographics: report
                    .demographics
                    .into_iter()
                    .map(ApiDemographic::from)
                    .collect(),
                environments: report
                    .environments
                    .into_iter()
                    .map(ApiEnvironment::from)
                    .collect(),
            };
            HttpResponse::Ok().json(detail)
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Community not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch community {community_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/communities/{id}/census`
///
/// Time series ordered ascending by year. 404 when the community does
/// not exist; an existing community with no records returns an empty
/// list.
pub async fn community_census(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let community_id = path.into_inner();

    match queries::get_community(state.db.as_ref(), community_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Community not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to fetch community {community_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    }

    match queries::census_time_series(state.db.as_ref(), community_id).await {
        Ok(rows) => {
            let points: Vec<ApiCensusPoint> = fishcensus_analytics::ordered_time_series(rows)
                .into_iter()
                .map(ApiCensusPoint::from)
                .collect();
            HttpResponse::Ok().json(points)
        }
        Err(e) => {
            log::error!("Failed to fetch census series for community {community_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/motivations`
///
/// Canonical motivation buckets across all communities, weighted by
/// fisherman counts.
pub async fn motivations(state: web::Data<AppState>) -> HttpResponse {
    match queries::community_motivations(state.db.as_ref()).await {
        Ok(rows) => HttpResponse::Ok().json(fishcensus_analytics::motivation_aggregate(&rows)),
        Err(e) => {
            log::error!("Failed to aggregate motivations: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/environments`
pub async fn environments(state: web::Data<AppState>) -> HttpResponse {
    match queries::list_environments(state.db.as_ref()).await {
        Ok(rows) => {
            let out: Vec<ApiEnvironment> = rows.into_iter().map(ApiEnvironment::from).collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => {
            log::error!("Failed to list environments: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `POST /api/environments`
///
/// Requires authentication. Returns 201 with the created environment,
/// or 400 when the name is empty.
pub async fn create_environment(
    state: web::Data<AppState>,
    _claims: AuthClaims,
    body: web::Json<CreateEnvironmentRequest>,
) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Environment name must not be empty"
        }));
    }

    match queries::create_environment(state.db.as_ref(), name, body.description.as_deref()).await {
        Ok(environment) => HttpResponse::Created().json(ApiEnvironment::from(environment)),
        Err(e) => {
            log::error!("Failed to create environment: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `POST /api/communities/{id}/environments`
///
/// Requires authentication. Links an existing environment to an
/// existing community; 404 when either side is absent.
pub async fn link_environment(
    state: web::Data<AppState>,
    _claims: AuthClaims,
    path: web::Path<i32>,
    body: web::Json<LinkEnvironmentRequest>,
) -> HttpResponse {
    let community_id = path.into_inner();

    match queries::get_community(state.db.as_ref(), community_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Community not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to fetch community {community_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    }

    let environment_exists = match queries::list_environments(state.db.as_ref()).await {
        Ok(rows) => rows.iter().any(|e| e.id == body.environment_id),
        Err(e) => {
            log::error!("Failed to list environments: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };
    if !environment_exists {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "Environment not found"
        }));
    }

    match queries::link_environment(state.db.as_ref(), community_id, body.environment_id).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "linked": true })),
        Err(e) => {
            log::error!(
                "Failed to link environment {} to community {community_id}: {e}",
                body.environment_id
            );
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `POST /api/import/{kind}`
///
/// Requires authentication. Accepts one multipart file part and runs
/// the import reconciler over it. 400 on an unknown kind or a request
/// with no file part.
pub async fn import(
    state: web::Data<AppState>,
    _claims: AuthClaims,
    path: web::Path<String>,
    mut payload: Multipart,
) -> HttpResponse {
    let Ok(kind) = path.into_inner().parse::<RecordKind>() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Unknown record kind"
        }));
    };

    let mut file_name: Option<String> = None;
    let mut bytes: Vec<u8> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Malformed multipart payload: {e}")
                }));
            }
        };
        if field.name() != "file" {
            continue;
        }
        file_name = field
            .content_disposition()
            .get_filename()
            .map(ToString::to_string);
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(chunk) => bytes.extend_from_slice(&chunk),
                Err(e) => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": format!("Failed to read upload: {e}")
                    }));
                }
            }
        }
    }

    let Some(file_name) = file_name else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Missing file part"
        }));
    };

    let options = ImportOptions::from_env();
    match fishcensus_import::import_file(state.db.as_ref(), kind, &file_name, &bytes, &options)
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            log::error!("Import of {file_name} failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/imports/{id}`
///
/// One import log row, for checking the outcome of an upload.
pub async fn import_log(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let log_id = path.into_inner();
    match queries::get_import_log(state.db.as_ref(), log_id).await {
        Ok(Some(entry)) => HttpResponse::Ok().json(entry),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Import log not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch import log {log_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/communities/{id}/export/xlsx`
pub async fn community_xlsx(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let community_id = path.into_inner();
    match build_report(&state, community_id).await {
        Ok(Some(report)) => {
            let name = attachment_name(&report.community.name);
            match fishcensus_export::spreadsheet::community_workbook(&report) {
                Ok(bytes) => xlsx_response(&name, bytes),
                Err(e) => {
                    log::error!("Failed to render workbook for community {community_id}: {e}");
                    HttpResponse::InternalServerError().json(serde_json::json!({
                        "error": e.to_string()
                    }))
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Community not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch community {community_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/communities/{id}/export/pdf`
pub async fn community_pdf(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let community_id = path.into_inner();
    match build_report(&state, community_id).await {
        Ok(Some(report)) => {
            let name = attachment_name(&report.community.name);
            match fishcensus_export::pdf::community_report_pdf(&report) {
                Ok(bytes) => HttpResponse::Ok()
                    .content_type("application/pdf")
                    .insert_header((
                        "Content-Disposition",
                        format!("attachment; filename=\"{name}.pdf\""),
                    ))
                    .body(bytes),
                Err(e) => {
                    log::error!("Failed to render PDF for community {community_id}: {e}");
                    HttpResponse::InternalServerError().json(serde_json::json!({
                        "error": e.to_string()
                    }))
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Community not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch community {community_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// `GET /api/municipalities/{id}/export/xlsx`
pub async fn municipality_xlsx(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let municipality_id = path.into_inner();

    let municipality =
        match queries::get_municipality(state.db.as_ref(), municipality_id).await {
            Ok(Some(m)) => m,
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Municipality not found"
                }));
            }
            Err(e) => {
                log::error!("Failed to fetch municipality {municipality_id}: {e}");
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": e.to_string()
                }));
            }
        };

    let rows =
        match queries::latest_census_by_community(state.db.as_ref(), Some(municipality_id)).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Failed to fetch rollup for municipality {municipality_id}: {e}");
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": e.to_string()
                }));
            }
        };

    let name = attachment_name(&municipality.name);
    match fishcensus_export::spreadsheet::municipality_workbook(&municipality.name, &rows) {
        Ok(bytes) => xlsx_response(&name, bytes),
        Err(e) => {
            log::error!("Failed to render workbook for municipality {municipality_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// Assembles the full report input for one community, or `None` when
/// the community does not exist.
async fn build_report(
    state: &web::Data<AppState>,
    community_id: i32,
) -> Result<Option<CommunityReport>, fishcensus_database::DbError> {
    let Some(community) = queries::get_community(state.db.as_ref(), community_id).await? else {
        return Ok(None);
    };
    let municipality = queries::get_municipality(state.db.as_ref(), community.municipality_id)
        .await?
        .map(|m| m.name)
        .unwrap_or_default();
    let latest_census = queries::latest_census(state.db.as_ref(), community_id).await?;
    let demographics = queries::demographics_for_community(state.db.as_ref(), community_id).await?;
    let environments = queries::environments_for_community(state.db.as_ref(), community_id).await?;

    Ok(Some(CommunityReport {
        community,
        municipality,
        latest_census,
        demographics,
        environments,
    }))
}

fn xlsx_response(name: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{name}.xlsx\""),
        ))
        .body(bytes)
}

/// Reduces a display name to a safe attachment file stem.
fn attachment_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        "export".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::attachment_name;

    #[test]
    fn attachment_name_replaces_non_ascii() {
        assert_eq!(attachment_name("Farol de São Tomé"), "Farol_de_S_o_Tom_");
    }

    #[test]
    fn attachment_name_falls_back_when_empty() {
        assert_eq!(attachment_name("—"), "export");
    }
}

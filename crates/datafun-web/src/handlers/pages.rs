//! HTML page handlers: one request runs one render cycle for one page.

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::{CookieJar, Query};
use chrono::NaiveDate;
use datafun_common::{DatafunError, Region};
use datafun_core::contact::ContactForm;
use datafun_core::{route, Event, FilterCriteria, Page, Rendered};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{WebError, WebResult};
use crate::render::{page_shell, render_blocks, settings_html};
use crate::session::session_id;
use crate::state::{SessionSnapshot, SharedState};

/// Query parameters understood by the page routes. Unused ones are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub region: Vec<String>,
    pub date_lo: Option<String>,
    pub date_hi: Option<String>,
    /// Present once the analysis form has been submitted.
    pub apply: Option<String>,
    pub column: Option<String>,
}

impl PageParams {
    /// Analysis criteria. Before the form is first applied the defaults hold.
    pub fn criteria(&self) -> WebResult<FilterCriteria> {
        if self.apply.is_none() {
            return Ok(FilterCriteria::default());
        }
        let regions = self
            .region
            .iter()
            .map(|r| r.parse::<Region>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FilterCriteria::from_input(
            regions,
            parse_date(self.date_lo.as_deref())?,
            parse_date(self.date_hi.as_deref())?,
        ))
    }
}

/// Empty date inputs count as unset.
pub(crate) fn parse_date(raw: Option<&str>) -> WebResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                WebError::Core(DatafunError::InvalidArgument(format!("invalid date '{}': {}", s, e)))
            }),
    }
}

#[derive(Debug, Deserialize)]
pub struct GuessForm {
    pub guess: i64,
}

/// GET / — the first sidebar entry is the landing page
pub async fn index() -> Redirect {
    Redirect::to(&Page::Overview.path())
}

/// GET /{page}
pub async fn show_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
    jar: CookieJar,
) -> WebResult<(CookieJar, Html<String>)> {
    let page = route(&slug)?;
    let (jar, sid) = session_id(jar);

    let criteria = params.criteria()?;
    let event = match page {
        Page::Analysis => Event::Filter(criteria.clone()),
        Page::Tools => match params.column.as_deref() {
            Some(column) if !column.is_empty() => Event::SelectColumn(column.to_string()),
            _ => Event::Show(page),
        },
        _ => Event::Show(page),
    };

    let (rendered, snapshot) = state.dispatch(sid, event)?;
    Ok((jar, Html(render_page(&rendered, &criteria, &snapshot))))
}

/// POST /{page} — game guesses, CSV uploads and contact messages
pub async fn submit_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    jar: CookieJar,
    request: Request,
) -> WebResult<(CookieJar, Html<String>)> {
    let page = route(&slug)?;
    let (jar, sid) = session_id(jar);

    let (rendered, snapshot) = match page {
        Page::Game => {
            let Form(form) = Form::<GuessForm>::from_request(request, &state)
                .await
                .map_err(|e| WebError::BadRequest(e.body_text()))?;
            state.dispatch(sid, Event::Guess(form.guess))?
        }
        Page::Tools => submit_upload(&state, sid, request).await?,
        Page::Contact => {
            let Form(form) = Form::<ContactForm>::from_request(request, &state)
                .await
                .map_err(|e| WebError::BadRequest(e.body_text()))?;
            // Simulated processing; no lock is held while waiting.
            if form.is_complete() {
                let delay = state.config.contact_delay();
                debug!("Processing contact message for {:?}", delay);
                tokio::time::sleep(delay).await;
            }
            state.dispatch(sid, Event::Contact(form))?
        }
        Page::Overview | Page::Analysis => return Err(WebError::MethodNotAllowed(page.label())),
    };

    Ok((jar, Html(render_page(&rendered, &FilterCriteria::default(), &snapshot))))
}

async fn submit_upload(
    state: &SharedState,
    sid: uuid::Uuid,
    request: Request,
) -> WebResult<(Rendered, SessionSnapshot)> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| WebError::BadRequest(e.body_text()))?;

    let mut upload = None;
    let mut column = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::BadRequest(e.body_text()))?;
                upload = Some((file_name, bytes));
            }
            Some("column") => {
                let text = field.text().await.map_err(|e| WebError::BadRequest(e.body_text()))?;
                if !text.is_empty() {
                    column = Some(text);
                }
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Err(WebError::BadRequest("missing 'file' field".to_string()));
    };
    info!("Upload '{}' ({} bytes)", file_name, bytes.len());

    // Parse off the async workers and before dispatch takes the session locks.
    let event = tokio::task::spawn_blocking(move || Event::upload(file_name, &bytes))
        .await
        .map_err(|e| WebError::Core(DatafunError::Other(e.into())))?;
    let result = state.dispatch(sid, event)?;
    match column {
        Some(column) if !result.1.columns.is_empty() => {
            Ok(state.dispatch(sid, Event::SelectColumn(column))?)
        }
        _ => Ok(result),
    }
}

fn render_page(rendered: &Rendered, criteria: &FilterCriteria, snapshot: &SessionSnapshot) -> String {
    page_shell(
        rendered.page,
        &settings_html(rendered.page, criteria, snapshot),
        &render_blocks(&rendered.blocks),
    )
}

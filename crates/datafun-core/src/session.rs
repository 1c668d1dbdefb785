//! Per-session state and the event reducer.
//!
//! Every user action becomes an [`Event`]; [`SessionState::handle`] applies it
//! to the session and returns the blocks for the page it belongs to.

use datafun_common::{DatafunError, Result};
use rand::Rng;
use tracing::{debug, info};

use crate::contact::{ContactForm, ContactOutcome};
use crate::dataset::Dataset;
use crate::filter::FilterCriteria;
use crate::game::GuessGame;
use crate::page::Page;
use crate::stats::Table;
use crate::view::{Block, DataTable};
use crate::views;

/// A parsed CSV file kept between renders of the tools page.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub table: Table,
    /// Whole-table `describe` output, computed once on arrival.
    pub summary: DataTable,
    selected: Option<String>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, table: Table) -> Self {
        let summary = views::describe_table(table.describe());
        Self {
            file_name: file_name.into(),
            table,
            summary,
            selected: None,
        }
    }

    /// Choose the column to analyse.
    pub fn select(&mut self, column: &str) -> Result<()> {
        if self.table.column_index(column).is_none() {
            return Err(DatafunError::InvalidArgument(format!("no column named '{}'", column)));
        }
        self.selected = Some(column.to_string());
        Ok(())
    }

    /// The chosen column, defaulting to the first one.
    pub fn selected_column(&self) -> Option<(usize, &str)> {
        let name = match &self.selected {
            Some(name) => name.as_str(),
            None => self.table.columns().first()?.as_str(),
        };
        self.table.column_index(name).map(|idx| (idx, name))
    }
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Plain render of a page with its default inputs.
    Show(Page),
    Filter(FilterCriteria),
    Guess(i64),
    /// A CSV file that parsed cleanly.
    Upload(Upload),
    /// A file that could not be read as CSV.
    RejectUpload { file_name: String, reason: String },
    SelectColumn(String),
    Contact(ContactForm),
}

impl Event {
    /// Parse an uploaded file into the matching event. This is the expensive
    /// part of an upload and needs no session, so callers run it before
    /// touching shared state.
    pub fn upload(file_name: impl Into<String>, bytes: &[u8]) -> Self {
        let file_name = file_name.into();
        match Table::from_csv(bytes) {
            Ok(table) => Event::Upload(Upload::new(file_name, table)),
            Err(err) => Event::RejectUpload { file_name, reason: err.to_string() },
        }
    }

    pub fn page(&self) -> Page {
        match self {
            Event::Show(page) => *page,
            Event::Filter(_)  => Page::Analysis,
            Event::Guess(_)   => Page::Game,
            Event::Upload(_) | Event::RejectUpload { .. } | Event::SelectColumn(_) => Page::Tools,
            Event::Contact(_) => Page::Contact,
        }
    }
}

/// What one render cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub page: Page,
    pub blocks: Vec<Block>,
}

/// Everything one session remembers between renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    game: GuessGame,
    contact: ContactForm,
    upload: Option<Upload>,
}

impl SessionState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_game(GuessGame::new(rng))
    }

    pub fn with_game(game: GuessGame) -> Self {
        Self {
            game,
            contact: ContactForm::default(),
            upload: None,
        }
    }

    pub fn game(&self) -> &GuessGame {
        &self.game
    }

    /// Values the contact form should currently show. Empty unless the last
    /// submission was incomplete.
    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    /// Apply one event and render the page it targets.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        event: Event,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<Rendered> {
        let page = event.page();
        debug!("Handling {} event for {}", event_name(&event), page.slug());

        let blocks = match event {
            Event::Show(Page::Overview) => views::overview(dataset),
            Event::Show(Page::Analysis) => views::analysis(dataset, &FilterCriteria::default()),
            Event::Show(Page::Game)     => views::game(&self.game, None),
            Event::Show(Page::Tools)    => views::tools(self.upload.as_ref(), None),
            Event::Show(Page::Contact)  => views::contact(None),

            Event::Filter(criteria) => views::analysis(dataset, &criteria),

            Event::Guess(guess) => {
                let outcome = self.game.submit_guess(guess, rng)?;
                views::game(&self.game, Some(outcome))
            }

            Event::Upload(upload) => {
                info!(
                    "Accepted upload '{}' ({} rows, {} columns)",
                    upload.file_name,
                    upload.table.n_rows(),
                    upload.table.n_cols()
                );
                self.upload = Some(upload);
                views::tools(self.upload.as_ref(), None)
            }

            Event::RejectUpload { file_name, reason } => {
                info!("Rejected upload '{}': {}", file_name, reason);
                self.upload = None;
                views::tools(None, Some(reason.as_str()))
            }

            Event::SelectColumn(column) => {
                if let Some(upload) = self.upload.as_mut() {
                    upload.select(&column)?;
                }
                views::tools(self.upload.as_ref(), None)
            }

            Event::Contact(form) => {
                if form.is_complete() {
                    info!(
                        "Contact message received from '{}' ({} chars)",
                        form.name,
                        form.message.chars().count()
                    );
                    self.contact.clear();
                    views::contact(Some(ContactOutcome::Sent))
                } else {
                    debug!("Incomplete contact form kept as draft");
                    self.contact = form;
                    views::contact(Some(ContactOutcome::Incomplete))
                }
            }
        };

        Ok(Rendered { page, blocks })
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Show(_)         => "show",
        Event::Filter(_)       => "filter",
        Event::Guess(_)        => "guess",
        Event::Upload(_)       => "upload",
        Event::RejectUpload { .. } => "reject_upload",
        Event::SelectColumn(_) => "select_column",
        Event::Contact(_)      => "contact",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate;
    use crate::view::Level;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup(secret: i64) -> (SessionState, Dataset, ChaCha20Rng) {
        (
            SessionState::with_game(GuessGame::with_secret(secret)),
            generate(100).unwrap(),
            ChaCha20Rng::seed_from_u64(5),
        )
    }

    fn has_notice(rendered: &Rendered, level: Level) -> bool {
        rendered.blocks.iter().any(|b| matches!(b, Block::Notice(l, _) if *l == level))
    }

    #[test]
    fn test_every_page_renders() {
        let (mut session, ds, mut rng) = setup(50);
        for page in Page::ALL {
            let rendered = session.handle(Event::Show(page), &ds, &mut rng).unwrap();
            assert_eq!(rendered.page, page);
            assert!(matches!(rendered.blocks[0], Block::Subheader(_)));
        }
    }

    #[test]
    fn test_guess_sequence_through_reducer() {
        let (mut session, ds, mut rng) = setup(50);

        let r = session.handle(Event::Guess(30), &ds, &mut rng).unwrap();
        assert!(r.blocks.contains(&Block::notice(Level::Warning, "Too low! Try a bigger number...")));
        assert_eq!(session.game().attempts(), 1);

        let r = session.handle(Event::Guess(70), &ds, &mut rng).unwrap();
        assert!(r.blocks.contains(&Block::notice(Level::Warning, "Too high! Try a smaller number...")));
        assert_eq!(session.game().guesses(), &[30, 70]);

        let r = session.handle(Event::Guess(50), &ds, &mut rng).unwrap();
        assert!(r.blocks.contains(&Block::text("You used 3 attempts")));
        assert_eq!(session.game().attempts(), 0);
        assert!(session.game().guesses().is_empty());
    }

    #[test]
    fn test_invalid_guess_is_an_error() {
        let (mut session, ds, mut rng) = setup(50);
        let err = session.handle(Event::Guess(500), &ds, &mut rng).unwrap_err();
        assert!(matches!(err, DatafunError::InvalidArgument(_)));
        assert_eq!(session.game().attempts(), 0);
    }

    #[test]
    fn test_upload_is_kept_and_column_selectable() {
        let (mut session, ds, mut rng) = setup(50);
        let upload = Event::upload("scores.csv", b"name,score\nann,3\nbob,5\n");
        session.handle(upload, &ds, &mut rng).unwrap();
        assert_eq!(session.upload().unwrap().selected_column(), Some((0, "name")));

        session.handle(Event::SelectColumn("score".to_string()), &ds, &mut rng).unwrap();
        assert_eq!(session.upload().unwrap().selected_column(), Some((1, "score")));

        let err = session
            .handle(Event::SelectColumn("nope".to_string()), &ds, &mut rng)
            .unwrap_err();
        assert!(matches!(err, DatafunError::InvalidArgument(_)));

        // Re-rendering the page keeps the previous upload.
        let r = session.handle(Event::Show(Page::Tools), &ds, &mut rng).unwrap();
        assert!(r.blocks.iter().any(|b| matches!(b, Block::Chart(_))));
    }

    #[test]
    fn test_bad_upload_reports_and_clears() {
        let (mut session, ds, mut rng) = setup(50);
        session.handle(Event::upload("ok.csv", b"a\n1\n"), &ds, &mut rng).unwrap();
        let r = session.handle(Event::upload("bad.csv", b"a,b\n1\n"), &ds, &mut rng).unwrap();
        assert!(has_notice(&r, Level::Error));
        assert!(session.upload().is_none());
    }

    #[test]
    fn test_contact_submission_clears_form() {
        let (mut session, ds, mut rng) = setup(50);
        let form = ContactForm::new("Ann", "ann@example.com", "Hello there");
        let r = session.handle(Event::Contact(form), &ds, &mut rng).unwrap();
        assert!(has_notice(&r, Level::Success));
        assert!(session.contact().is_empty());
    }

    #[test]
    fn test_incomplete_contact_keeps_draft() {
        let (mut session, ds, mut rng) = setup(50);
        let draft = ContactForm::new("Ann", "", "Hello there");
        let r = session.handle(Event::Contact(draft.clone()), &ds, &mut rng).unwrap();
        assert!(has_notice(&r, Level::Warning));
        assert!(!has_notice(&r, Level::Success));
        assert_eq!(session.contact(), &draft);

        let done = ContactForm::new("Ann", "ann@example.com", "Hello there");
        session.handle(Event::Contact(done), &ds, &mut rng).unwrap();
        assert!(session.contact().is_empty());
    }

    #[test]
    fn test_upload_event_is_parsed_up_front() {
        match Event::upload("x.csv", b"a,b\n1,2\n") {
            Event::Upload(upload) => {
                assert_eq!(upload.summary.columns, vec!["", "a", "b"]);
                assert_eq!(upload.table.n_rows(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            Event::upload("y.csv", b"a,b\n1\n"),
            Event::RejectUpload { ref reason, .. } if reason.starts_with("Could not parse file")
        ));
    }

    #[test]
    fn test_filter_event_targets_analysis() {
        let (mut session, ds, mut rng) = setup(50);
        let r = session
            .handle(Event::Filter(FilterCriteria::default()), &ds, &mut rng)
            .unwrap();
        assert_eq!(r.page, Page::Analysis);
    }
}

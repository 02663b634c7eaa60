use crate::category::{Category, CategoryId};
use crate::error::CatalogError;
use crate::service::CatalogService;

/// What a saved session did.
#[derive(Debug)]
pub enum SaveOutcome {
    /// A new category was created.
    Created(Category),
    /// The category with this id was updated in place.
    Updated(CategoryId),
}

enum Mode {
    Create,
    Edit { id: CategoryId },
}

/// An in-progress create-or-edit of one category.
///
/// The session holds the draft an operator is typing into: a name and the
/// download URL of an attached image. Attaching uploads the image right
/// away; the record only moves on [`save`]. A failed save leaves mode and
/// draft intact so the caller can correct and retry. Methods take
/// `&mut self`, so one session never runs two store operations at once.
///
/// [`save`]: EditSession::save
pub struct EditSession {
    mode: Mode,
    draft_name: String,
    draft_image_url: Option<String>,
}

impl EditSession {
    /// A fresh session, ready to create.
    pub fn new() -> Self {
        Self {
            mode: Mode::Create,
            draft_name: String::new(),
            draft_image_url: None,
        }
    }

    /// Switch to creating a new category, dropping any draft.
    pub fn start_create(&mut self) {
        self.mode = Mode::Create;
        self.draft_name.clear();
        self.draft_image_url = None;
    }

    /// Switch to editing `category`, prefilled with its stored values.
    pub fn start_edit(&mut self, category: &Category) {
        self.mode = Mode::Edit {
            id: category.id.clone(),
        };
        self.draft_name = category.general_name.clone();
        self.draft_image_url = category.image_url.clone();
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft_name = name.into();
    }

    pub fn draft_image_url(&self) -> Option<&str> {
        self.draft_image_url.as_deref()
    }

    /// Upload an image and attach its URL to the draft.
    ///
    /// On failure the draft is unchanged. Attaching over an already
    /// attached image only swaps the URL; the earlier upload stays in the
    /// blob store.
    pub async fn attach_image(
        &mut self,
        service: &CatalogService,
        file_name: &str,
        data: &[u8],
    ) -> Result<String, CatalogError> {
        let url = service.upload_image(file_name, data).await?;
        self.draft_image_url = Some(url.clone());
        Ok(url)
    }

    /// Remove the attached image's blob and clear it from the draft.
    ///
    /// The draft keeps the URL unless the removal went through. In an edit
    /// session the stored record still carries the URL until the next
    /// [`save`](EditSession::save) writes it out empty. Without an attached
    /// image this is a no-op.
    pub async fn detach_image(&mut self, service: &CatalogService) -> Result<(), CatalogError> {
        let Some(url) = self.draft_image_url.clone() else {
            return Ok(());
        };
        service.remove_image(&url).await?;
        self.draft_image_url = None;
        Ok(())
    }

    /// Commit the draft: create a new record or rewrite the edited one.
    ///
    /// On success the session resets to a blank create. On error mode and
    /// draft stay as they were, so the session can be corrected and saved
    /// again; an attached image keeps its URL and is not re-uploaded.
    pub async fn save(&mut self, service: &CatalogService) -> Result<SaveOutcome, CatalogError> {
        let outcome = match &self.mode {
            Mode::Create => {
                let created = service
                    .create_category(&self.draft_name, self.draft_image_url.clone())
                    .await?;
                SaveOutcome::Created(created)
            }
            Mode::Edit { id } => {
                service
                    .update_category(id, &self.draft_name, self.draft_image_url.clone())
                    .await?;
                SaveOutcome::Updated(id.clone())
            }
        };

        self.start_create();
        Ok(outcome)
    }

    /// Abandon the draft and return to a blank create.
    ///
    /// An attached-but-unsaved image is not reclaimed: its blob stays in
    /// the store with nothing referencing it. Detach before cancelling to
    /// release it.
    pub fn cancel(&mut self) {
        self.start_create();
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

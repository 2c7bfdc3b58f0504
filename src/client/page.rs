use uuid::Uuid;

use super::{ClientError, Resource, ResourceClient, Scope};

const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

/// What the form hands over on submit.
pub enum Submission<R: Resource> {
    New(R::Create),
    Edit(R::Update),
}

/// State of one CRUD page: the fetched collection plus the modal flow
/// around it. Every successful mutation re-fetches the collection; every
/// failure leaves a generic notification and is not retried.
pub struct PageState<R: Resource> {
    pub scope: Scope,
    pub loading: bool,
    pub items: Vec<R::Record>,
    pub selected: Option<R::Record>,
    pub form_open: bool,
    pub delete_open: bool,
    pub notification: Option<Notification>,
}

impl<R: Resource> PageState<R> {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            loading: false,
            items: Vec::new(),
            selected: None,
            form_open: false,
            delete_open: false,
            notification: None,
        }
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected.as_ref().map(R::id)
    }

    pub async fn refresh(&mut self, client: &ResourceClient<R>) -> Result<(), ClientError> {
        self.loading = true;
        let result = client.list(&self.scope).await;
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Switch the page to another scope and fetch it.
    pub async fn rescope(
        &mut self,
        client: &ResourceClient<R>,
        scope: Scope,
    ) -> Result<(), ClientError> {
        self.scope = scope;
        self.selected = None;
        self.refresh(client).await
    }

    pub fn open_create(&mut self) {
        self.selected = None;
        self.form_open = true;
    }

    pub fn open_edit(&mut self, record: R::Record) {
        self.selected = Some(record);
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
        self.selected = None;
    }

    pub fn open_delete(&mut self, record: R::Record) {
        self.selected = Some(record);
        self.delete_open = true;
    }

    pub fn cancel_delete(&mut self) {
        self.delete_open = false;
        self.selected = None;
    }

    /// Notifications are shown once.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Create when nothing is selected, update the selected record otherwise.
    /// An edit with nothing selected only raises the failure notice.
    pub async fn submit(
        &mut self,
        client: &ResourceClient<R>,
        submission: Submission<R>,
    ) -> Result<(), ClientError> {
        let result = match (self.selected_id(), submission) {
            (Some(id), Submission::Edit(patch)) => {
                client.update(id, &patch).await.map(|_| "Saved")
            }
            (_, Submission::New(input)) => client.create(&input).await.map(|_| "Created"),
            (None, Submission::Edit(_)) => {
                self.notification = Some(Notification::Failure(FAILURE_MESSAGE.to_string()));
                return Ok(());
            }
        };

        match result {
            Ok(message) => {
                self.close_form();
                self.notification = Some(Notification::Success(message.to_string()));
                self.refresh(client).await
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn confirm_delete(&mut self, client: &ResourceClient<R>) -> Result<(), ClientError> {
        let Some(id) = self.selected_id() else {
            self.delete_open = false;
            return Ok(());
        };

        match client.delete(id).await {
            Ok(()) => {
                self.cancel_delete();
                self.notification = Some(Notification::Success("Deleted".to_string()));
                self.refresh(client).await
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        tracing::warn!("Request failed: {err}");
        self.notification = Some(Notification::Failure(FAILURE_MESSAGE.to_string()));
        err
    }
}

//! Asynchronous environment map loading
//!
//! Selecting an environment issues one load request. The HDR file is decoded
//! off the UI thread and the completion is queued on a channel; the frame loop
//! drains the queue with [`EnvironmentLoader::poll`] and installs each decoded
//! image into the [`EnvironmentSlot`] in a single assignment, so a frame sees
//! either the old environment or the new one and never a mix.
//!
//! Requests are never cancelled. When two loads race, the installation order
//! is the completion order; see [`LoadPolicy`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::{Deserialize, Serialize};

use super::{AssetError, EnvironmentCatalog};

/// Largest width or height the renderer's device accepts for a 2D texture
pub const MAX_ENVIRONMENT_DIMENSION: u32 = 4096;

/// Decoded equirectangular HDR image, RGBA32F (alpha is always 1)
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

impl EnvironmentImage {
    /// Decodes a Radiance `.hdr` file
    pub fn decode(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|e| AssetError::from_image(path, e))?;
        let rgb = image.to_rgb32f();
        let (width, height) = (rgb.width(), rgb.height());

        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for pixel in rgb.pixels() {
            pixels.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 1.0]);
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Identifies one load request; later requests have larger tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    pub result: Result<EnvironmentImage, AssetError>,
}

pub type CompletionSender = UnboundedSender<LoadCompletion>;

/// Runs a load request and reports its completion on `done`
pub trait LoadExecutor {
    fn execute(&self, request: LoadRequest, done: CompletionSender);
}

/// Decodes each request on its own short-lived thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadExecutor;

impl LoadExecutor for ThreadExecutor {
    fn execute(&self, request: LoadRequest, done: CompletionSender) {
        let thread_name = format!("env-load-{}", request.ticket.0);
        dispatch(request, done, |job| {
            std::thread::Builder::new()
                .name(thread_name)
                .spawn(job)
                .map(drop)
        });
    }
}

type DecodeJob = Box<dyn FnOnce() + Send>;

/// Hands the decode job to `spawn`
///
/// If `spawn` fails the request still completes, as a failed load, so the
/// loader's in-flight count always comes back down.
fn dispatch<S>(request: LoadRequest, done: CompletionSender, spawn: S)
where
    S: FnOnce(DecodeJob) -> std::io::Result<()>,
{
    let fallback = (request.clone(), done.clone());
    let job: DecodeJob = Box::new(move || {
        let result = EnvironmentImage::decode(&request.path);
        // The receiver lives as long as the loader; a send error only
        // means the app is shutting down.
        let _ = done.unbounded_send(LoadCompletion { request, result });
    });

    if let Err(error) = spawn(job) {
        log::error!("Failed to spawn environment load thread: {error}");
        let (request, done) = fallback;
        let path = request.path.clone();
        let _ = done.unbounded_send(LoadCompletion {
            request,
            result: Err(AssetError::Io {
                path,
                source: error,
            }),
        });
    }
}

/// How racing completions are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Every successful completion is installed in arrival order, so a slow
    /// earlier request can replace a newer selection.
    #[default]
    LastCompletionWins,
    /// Completions older than the installed environment's request are dropped.
    LatestRequestWins,
}

/// The environment currently used as background and ambient light
#[derive(Debug, Clone)]
pub struct InstalledEnvironment {
    pub name: String,
    pub path: PathBuf,
    pub ticket: LoadTicket,
    pub image: Arc<EnvironmentImage>,
}

#[derive(Debug, Default)]
pub struct EnvironmentSlot {
    current: Option<InstalledEnvironment>,
    generation: u64,
}

impl EnvironmentSlot {
    pub fn current(&self) -> Option<&InstalledEnvironment> {
        self.current.as_ref()
    }

    /// Bumped on every install; the renderer re-uploads when it changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn install(&mut self, environment: InstalledEnvironment) {
        self.current = Some(environment);
        self.generation += 1;
    }
}

pub struct EnvironmentLoader<E = ThreadExecutor> {
    catalog: EnvironmentCatalog,
    executor: E,
    policy: LoadPolicy,
    next_ticket: u64,
    in_flight: usize,
    max_dimension: u32,
    sender: CompletionSender,
    receiver: UnboundedReceiver<LoadCompletion>,
}

impl EnvironmentLoader<ThreadExecutor> {
    pub fn new(catalog: EnvironmentCatalog, policy: LoadPolicy) -> Self {
        Self::with_executor(catalog, policy, ThreadExecutor)
    }
}

impl<E: LoadExecutor> EnvironmentLoader<E> {
    pub fn with_executor(catalog: EnvironmentCatalog, policy: LoadPolicy, executor: E) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            catalog,
            executor,
            policy,
            next_ticket: 0,
            in_flight: 0,
            max_dimension: MAX_ENVIRONMENT_DIMENSION,
            sender,
            receiver,
        }
    }

    pub fn catalog(&self) -> &EnvironmentCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Number of requests issued whose completion has not been polled yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Issues exactly one load for the catalog entry `name`
    ///
    /// Unknown names are rejected without issuing anything.
    pub fn request(&mut self, name: &str) -> Result<LoadTicket, AssetError> {
        let path = self.catalog.resolve(name)?.to_path_buf();
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);

        log::info!("Loading environment '{}' from {}", name, path.display());
        self.in_flight += 1;
        self.executor.execute(
            LoadRequest {
                ticket,
                name: name.to_string(),
                path,
            },
            self.sender.clone(),
        );

        Ok(ticket)
    }

    /// Installs every completion that has arrived since the last poll
    ///
    /// Returns the number of environments installed. Failed loads are logged
    /// and leave the slot as it was.
    pub fn poll(&mut self, slot: &mut EnvironmentSlot) -> usize {
        let mut installed = 0;

        while let Ok(Some(completion)) = self.receiver.try_next() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let LoadCompletion { request, result } = completion;

            let image = match result.and_then(|image| self.check_size(&request, image)) {
                Ok(image) => image,
                Err(error) => {
                    log::warn!(
                        "Environment '{}' failed to load, keeping current: {error}",
                        request.name
                    );
                    continue;
                }
            };

            if self.policy == LoadPolicy::LatestRequestWins {
                if let Some(current) = slot.current() {
                    if current.ticket > request.ticket {
                        log::debug!(
                            "Dropping stale environment '{}' (ticket {} < {})",
                            request.name,
                            request.ticket.0,
                            current.ticket.0
                        );
                        continue;
                    }
                }
            }

            log::info!(
                "Installed environment '{}' ({}x{})",
                request.name,
                image.width,
                image.height
            );
            slot.install(InstalledEnvironment {
                name: request.name,
                path: request.path,
                ticket: request.ticket,
                image: Arc::new(image),
            });
            installed += 1;
        }

        installed
    }

    fn check_size(
        &self,
        request: &LoadRequest,
        image: EnvironmentImage,
    ) -> Result<EnvironmentImage, AssetError> {
        if image.width > self.max_dimension || image.height > self.max_dimension {
            return Err(AssetError::TooLarge {
                path: request.path.clone(),
                width: image.width,
                height: image.height,
                max: self.max_dimension,
            });
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    /// Holds requests until the test completes them, in any order
    #[derive(Clone, Default)]
    struct ManualExecutor {
        pending: Rc<RefCell<Vec<(LoadRequest, CompletionSender)>>>,
    }

    impl LoadExecutor for ManualExecutor {
        fn execute(&self, request: LoadRequest, done: CompletionSender) {
            self.pending.borrow_mut().push((request, done));
        }
    }

    impl ManualExecutor {
        fn requests(&self) -> Vec<LoadRequest> {
            self.pending.borrow().iter().map(|(r, _)| r.clone()).collect()
        }

        fn complete(&self, ticket: LoadTicket, result: Result<EnvironmentImage, AssetError>) {
            let mut pending = self.pending.borrow_mut();
            let index = pending
                .iter()
                .position(|(r, _)| r.ticket == ticket)
                .expect("no such pending request");
            let (request, done) = pending.remove(index);
            done.unbounded_send(LoadCompletion { request, result }).unwrap();
        }
    }

    fn image(value: f32) -> EnvironmentImage {
        EnvironmentImage {
            width: 1,
            height: 1,
            pixels: vec![value, value, value, 1.0],
        }
    }

    fn loader(policy: LoadPolicy) -> (EnvironmentLoader<ManualExecutor>, ManualExecutor) {
        let executor = ManualExecutor::default();
        let loader = EnvironmentLoader::with_executor(
            EnvironmentCatalog::new("assets"),
            policy,
            executor.clone(),
        );
        (loader, executor)
    }

    #[test]
    fn selecting_a_key_issues_exactly_one_request_for_its_path() {
        let (mut loader, executor) = loader(LoadPolicy::default());

        let ticket = loader.request("Suburbs").unwrap();

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ticket, ticket);
        assert_eq!(requests[0].name, "Suburbs");
        assert_eq!(
            requests[0].path,
            Path::new("assets/environmentMap/suburbs.hdr")
        );
        assert_eq!(loader.in_flight(), 1);
    }

    #[test]
    fn reselecting_the_same_key_issues_another_request() {
        let (mut loader, executor) = loader(LoadPolicy::default());
        let first = loader.request("Forest").unwrap();
        let second = loader.request("Forest").unwrap();
        assert!(second > first);
        assert_eq!(executor.requests().len(), 2);
    }

    #[test]
    fn unknown_key_is_rejected_without_a_request() {
        let (mut loader, executor) = loader(LoadPolicy::default());
        assert!(matches!(
            loader.request("Moon Base"),
            Err(AssetError::UnknownEnvironment(_))
        ));
        assert!(executor.requests().is_empty());
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn nothing_is_installed_before_completion() {
        let (mut loader, _executor) = loader(LoadPolicy::default());
        let mut slot = EnvironmentSlot::default();
        loader.request("Forest").unwrap();

        assert_eq!(loader.poll(&mut slot), 0);
        assert!(slot.current().is_none());
        assert_eq!(slot.generation(), 0);
    }

    #[test]
    fn last_completion_wins_regardless_of_request_order() {
        let (mut loader, executor) = loader(LoadPolicy::LastCompletionWins);
        let mut slot = EnvironmentSlot::default();

        let older = loader.request("City Center").unwrap();
        let newer = loader.request("Forest").unwrap();

        executor.complete(newer, Ok(image(2.0)));
        executor.complete(older, Ok(image(1.0)));
        assert_eq!(loader.poll(&mut slot), 2);

        let current = slot.current().unwrap();
        assert_eq!(current.name, "City Center");
        assert_eq!(current.ticket, older);
        assert_eq!(current.image.texel(0, 0)[0], 1.0);
        assert_eq!(slot.generation(), 2);
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn completions_across_polls_install_in_arrival_order() {
        let (mut loader, executor) = loader(LoadPolicy::LastCompletionWins);
        let mut slot = EnvironmentSlot::default();

        let a = loader.request("Closed Room").unwrap();
        let b = loader.request("City Night").unwrap();

        executor.complete(a, Ok(image(1.0)));
        loader.poll(&mut slot);
        assert_eq!(slot.current().unwrap().name, "Closed Room");

        executor.complete(b, Ok(image(2.0)));
        loader.poll(&mut slot);
        assert_eq!(slot.current().unwrap().name, "City Night");
    }

    #[test]
    fn latest_request_policy_drops_stale_completions() {
        let (mut loader, executor) = loader(LoadPolicy::LatestRequestWins);
        let mut slot = EnvironmentSlot::default();

        let older = loader.request("City Center").unwrap();
        let newer = loader.request("Forest").unwrap();

        executor.complete(newer, Ok(image(2.0)));
        executor.complete(older, Ok(image(1.0)));
        assert_eq!(loader.poll(&mut slot), 1);

        assert_eq!(slot.current().unwrap().name, "Forest");
        assert_eq!(slot.generation(), 1);
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn failed_load_keeps_previous_environment() {
        let (mut loader, executor) = loader(LoadPolicy::default());
        let mut slot = EnvironmentSlot::default();

        let good = loader.request("Suburbs").unwrap();
        executor.complete(good, Ok(image(3.0)));
        loader.poll(&mut slot);

        let bad = loader.request("Forest").unwrap();
        executor.complete(
            bad,
            Err(AssetError::Io {
                path: PathBuf::from("assets/environmentMap/forest.hdr"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            }),
        );
        assert_eq!(loader.poll(&mut slot), 0);

        assert_eq!(slot.current().unwrap().name, "Suburbs");
        assert_eq!(slot.generation(), 1);
    }

    #[test]
    fn oversized_image_is_a_failed_load() {
        let (mut loader, executor) = loader(LoadPolicy::default());
        let mut slot = EnvironmentSlot::default();

        let good = loader.request("Suburbs").unwrap();
        executor.complete(good, Ok(image(3.0)));
        loader.poll(&mut slot);

        let wide = MAX_ENVIRONMENT_DIMENSION + 1;
        let huge = loader.request("Forest").unwrap();
        executor.complete(
            huge,
            Ok(EnvironmentImage {
                width: wide,
                height: 1,
                pixels: vec![1.0; wide as usize * 4],
            }),
        );
        assert_eq!(loader.poll(&mut slot), 0);

        assert_eq!(slot.current().unwrap().name, "Suburbs");
        assert_eq!(slot.generation(), 1);
        assert_eq!(loader.in_flight(), 0);
    }

    struct NoThreadsExecutor;

    impl LoadExecutor for NoThreadsExecutor {
        fn execute(&self, request: LoadRequest, done: CompletionSender) {
            dispatch(request, done, |_job| {
                Err(std::io::Error::other("no threads"))
            });
        }
    }

    #[test]
    fn spawn_failure_completes_as_failed_load() {
        let mut loader = EnvironmentLoader::with_executor(
            EnvironmentCatalog::new("assets"),
            LoadPolicy::default(),
            NoThreadsExecutor,
        );
        let mut slot = EnvironmentSlot::default();

        loader.request("Forest").unwrap();
        assert_eq!(loader.in_flight(), 1);

        assert_eq!(loader.poll(&mut slot), 0);
        assert_eq!(loader.in_flight(), 0);
        assert!(slot.current().is_none());
    }

    fn poll_until_idle<E: LoadExecutor>(loader: &mut EnvironmentLoader<E>, slot: &mut EnvironmentSlot) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while loader.in_flight() > 0 && Instant::now() < deadline {
            loader.poll(slot);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn thread_executor_decodes_hdr_files() {
        let root = std::env::temp_dir().join(format!("sheen-env-{}", std::process::id()));
        let path = root.join("environmentMap/city_night.hdr");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let pixels = vec![image::Rgb([1.0f32, 0.5, 0.25]); 4 * 2];
        let file = std::fs::File::create(&path).unwrap();
        image::codecs::hdr::HdrEncoder::new(std::io::BufWriter::new(file))
            .encode(&pixels, 4, 2)
            .unwrap();

        let mut loader = EnvironmentLoader::new(EnvironmentCatalog::new(&root), LoadPolicy::default());
        let mut slot = EnvironmentSlot::default();
        loader.request("City Night").unwrap();
        poll_until_idle(&mut loader, &mut slot);

        let current = slot.current().expect("environment installed");
        assert_eq!((current.image.width, current.image.height), (4, 2));
        let texel = current.image.texel(3, 1);
        assert_relative_eq!(texel[0], 1.0, epsilon = 0.02);
        assert_relative_eq!(texel[1], 0.5, epsilon = 0.02);
        assert_relative_eq!(texel[2], 0.25, epsilon = 0.02);
        assert_eq!(texel[3], 1.0);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn thread_executor_reports_missing_files_without_installing() {
        let mut loader = EnvironmentLoader::new(
            EnvironmentCatalog::new("/no/such/asset/root"),
            LoadPolicy::default(),
        );
        let mut slot = EnvironmentSlot::default();
        loader.request("Forest").unwrap();
        poll_until_idle(&mut loader, &mut slot);

        assert_eq!(loader.in_flight(), 0);
        assert!(slot.current().is_none());
    }
}

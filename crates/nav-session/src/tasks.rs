//! Where background route computations run.

/// Runs a boxed job somewhere other than (or, for tests, on) the caller's
/// thread.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>);
}

/// Spawns onto rayon's global thread pool.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayonSpawner;

impl TaskSpawner for RayonSpawner {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        rayon::spawn(job);
    }
}

/// Runs the job immediately on the calling thread.  The result still travels
/// through the engine's channel, so ordering matches the threaded case.
#[derive(Copy, Clone, Debug, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        job();
    }
}

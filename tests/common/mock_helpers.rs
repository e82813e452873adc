//! Mock construction helpers

use mockall::mock;
use std::sync::{Arc, Mutex};
use volpipe::{Batch, BatchSource, Request, Result};

use super::builders::VolumeBuilder;

mock! {
    pub Source {}

    impl BatchSource for Source {
        fn name(&self) -> &str;
        fn provide(&self, request: &Request) -> Result<Batch>;
    }
}

/// Mock source that serves ramp volumes for whatever it is asked and records
/// every request it receives.
pub fn recording_source() -> (MockSource, Arc<Mutex<Vec<Request>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let mut source = MockSource::new();
    source.expect_name().return_const("mock".to_string());
    source.expect_provide().returning(move |request| {
        log.lock().unwrap().push(request.clone());
        let mut batch = Batch::new();
        for (volume_type, roi) in request.iter() {
            batch.insert(volume_type.clone(), VolumeBuilder::new(roi.clone()).build());
        }
        Ok(batch)
    });
    (source, seen)
}

#![no_main]
use libfuzzer_sys::fuzz_target;
use oildrop_config::AnnotationRecord;

fuzz_target!(|data: &str| {
    if let Ok(rec) = data.parse::<AnnotationRecord>() {
        assert!(rec.y_center.is_finite());
        // Whatever parses must survive a write/read cycle
        let again: AnnotationRecord = rec.to_line().parse().unwrap();
        assert_eq!(again.class_id, rec.class_id);
    }
});

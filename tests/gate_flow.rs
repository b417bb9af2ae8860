use nextstep_gate::gate::{
    bootstrap, AccessGate, Document, ElementId, GateConfig, GateError, GatePhase, HostHooks,
    MemoryStore, NavigationContext, PageLoad, PageSurface, SessionStore, Tag, VerificationState,
    VERIFIED_MARKER_KEY,
};
use nextstep_gate::identity::{Identity, IdentityProvider, ProviderError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

const TRUSTED: &str = "https://nextstep-nexn.onrender.com/colleges";

/// Provider with a scripted answer that counts exchanges.
struct Scripted {
    answer: Result<Identity, ProviderError>,
    calls: AtomicUsize,
}

impl Scripted {
    fn accepting() -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(Identity::new("uid-1", Some("x@y.com".to_string()))),
            calls: AtomicUsize::new(0),
        })
    }

    fn expired() -> Arc<Self> {
        Arc::new(Self {
            answer: Err(ProviderError::Rejected("TOKEN_EXPIRED".to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for Scripted {
    async fn exchange(&self, _token: &str) -> Result<Identity, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

struct Seeded {
    load: PageLoad<Document, MemoryStore>,
    button: ElementId,
    input: ElementId,
    link: ElementId,
    denied: Arc<AtomicUsize>,
    initialized: Arc<AtomicUsize>,
}

fn seeded_page() -> Seeded {
    let mut doc = Document::new("College Finder");
    let form = doc.append_to_body(Tag::Form);
    let input = doc.append_child(form, Tag::Input);
    doc.set_attribute(input, "name", "rank");
    let button = doc.append_child(form, Tag::Button);
    doc.append_text(button, "Find Colleges");
    let footer = doc.append_to_body(Tag::P);
    let link = doc.append_child(footer, Tag::A);
    doc.set_attribute(link, "href", "/about");

    let denied = Arc::new(AtomicUsize::new(0));
    let initialized = Arc::new(AtomicUsize::new(0));
    let hooks = HostHooks::new()
        .on_denied({
            let denied = denied.clone();
            move || {
                denied.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_verified({
            let initialized = initialized.clone();
            move || {
                initialized.fetch_add(1, Ordering::SeqCst);
            }
        });

    Seeded {
        load: PageLoad::new(doc, MemoryStore::new(), hooks),
        button,
        input,
        link,
        denied,
        initialized,
    }
}

fn navigation(query: &str, referrer: Option<&str>) -> NavigationContext {
    NavigationContext::from_query(Some(query), referrer)
}

fn body_text(seeded: &Seeded) -> String {
    seeded.load.surface().body_text().to_lowercase()
}

#[tokio::test]
async fn trusted_referrer_with_accepted_token_is_verified() {
    let provider = Scripted::accepting();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());
    let mut seeded = seeded_page();
    let before = seeded.load.surface().render();
    let reader = seeded.load.verification();

    let verified = gate
        .run(&navigation("token=abc123", Some(TRUSTED)), &mut seeded.load)
        .await;

    assert!(verified);
    assert_eq!(seeded.load.phase(), GatePhase::Verified);
    assert_eq!(
        reader.snapshot(),
        VerificationState::Verified(Identity::new("uid-1", Some("x@y.com".to_string())))
    );
    assert_eq!(seeded.load.surface().render(), before);
    assert_eq!(
        seeded.load.storage().get_item(VERIFIED_MARKER_KEY),
        Some("true".to_string())
    );
    assert_eq!(provider.calls(), 1);
    assert_eq!(seeded.denied.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn untrusted_origin_is_denied_regardless_of_token() {
    let provider = Scripted::accepting();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());

    for referrer in [Some("https://evil.example/"), None] {
        let mut seeded = seeded_page();
        let verified = gate
            .run(
                &navigation("token=abc123&source=something-else", referrer),
                &mut seeded.load,
            )
            .await;

        assert!(!verified);
        assert_eq!(seeded.load.denial(), Some(GateError::OriginRejected));
        assert!(body_text(&seeded).contains("referrer or source"));
        assert!(!seeded.load.verification().is_verified());
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn missing_token_is_denied() {
    let provider = Scripted::accepting();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());

    for query in ["", "token=", "source=nextstep-nexn"] {
        let mut seeded = seeded_page();
        let verified = gate
            .run(&navigation(query, Some(TRUSTED)), &mut seeded.load)
            .await;

        assert!(!verified, "query: {query:?}");
        assert_eq!(seeded.load.denial(), Some(GateError::TokenMissing));
        assert!(body_text(&seeded).contains("no authentication token"));
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_failure_is_denied_without_propagating() {
    let provider = Scripted::expired();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());
    let mut seeded = seeded_page();

    let verified = gate
        .run(&navigation("token=expired", Some(TRUSTED)), &mut seeded.load)
        .await;

    assert!(!verified);
    assert_eq!(seeded.load.denial(), Some(GateError::TokenInvalid));
    assert!(body_text(&seeded).contains("invalid authentication token"));
    assert_eq!(seeded.load.storage().get_item(VERIFIED_MARKER_KEY), None);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn repeated_page_loads_exchange_once_each() {
    let provider = Scripted::accepting();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());
    let context = navigation("token=abc123", Some(TRUSTED));

    for expected_calls in 1..=2 {
        let mut seeded = seeded_page();
        assert!(gate.run(&context, &mut seeded.load).await);
        assert!(seeded.load.verification().is_verified());
        assert_eq!(provider.calls(), expected_calls);
    }
}

#[tokio::test]
async fn decided_page_load_is_not_rerun() {
    let provider = Scripted::accepting();
    let gate = AccessGate::new(GateConfig::default(), provider.clone());
    let mut seeded = seeded_page();

    assert!(!gate.run(&navigation("", None), &mut seeded.load).await);
    assert!(
        !gate
            .run(&navigation("token=abc123", Some(TRUSTED)), &mut seeded.load)
            .await
    );

    assert_eq!(provider.calls(), 0);
    assert_eq!(seeded.denied.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn denial_disables_previous_interactive_elements() {
    let gate = AccessGate::new(GateConfig::default(), Scripted::accepting());
    let mut seeded = seeded_page();

    let verified = gate
        .run(&navigation("token=abc123", None), &mut seeded.load)
        .await;
    assert!(!verified);

    let doc = seeded.load.surface();
    for id in [seeded.button, seeded.input, seeded.link] {
        let element = doc.element(id).expect("element exists");
        assert!(element.is_disabled(), "{id:?} should be disabled");
        assert!(element.pointer_events_suppressed());
        assert!(!doc.is_attached(id));
    }

    // The link back to NextStep stays usable.
    let remaining = doc.interactive_elements();
    assert_eq!(remaining.len(), 1);
    let link = doc.element(remaining[0]).expect("element exists");
    assert!(!link.is_disabled());
    assert_eq!(
        link.attribute("href"),
        Some("https://nextstep-nexn.onrender.com/")
    );

    assert_eq!(seeded.denied.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn source_tag_alone_passes_the_origin_check() {
    let gate = AccessGate::new(GateConfig::default(), Scripted::accepting());
    let mut seeded = seeded_page();

    let verified = gate
        .run(
            &navigation("source=nextstep-nexn&token=abc123", None),
            &mut seeded.load,
        )
        .await;

    assert!(verified);
    assert_eq!(
        seeded.load.verification().identity(),
        Some(Identity::new("uid-1", Some("x@y.com".to_string())))
    );
}

#[tokio::test]
async fn bootstrap_initializes_host_only_when_verified() {
    let gate = AccessGate::new(GateConfig::default(), Scripted::accepting());

    let mut verified = seeded_page();
    assert!(bootstrap(&gate, &navigation("token=abc123", Some(TRUSTED)), &mut verified.load).await);
    assert_eq!(verified.initialized.load(Ordering::SeqCst), 1);
    assert_eq!(verified.denied.load(Ordering::SeqCst), 0);

    // The page-ready event fires once; a stray second call changes nothing.
    assert!(bootstrap(&gate, &navigation("token=abc123", Some(TRUSTED)), &mut verified.load).await);
    assert_eq!(verified.initialized.load(Ordering::SeqCst), 1);

    let mut denied = seeded_page();
    assert!(!bootstrap(&gate, &navigation("token=abc123", None), &mut denied.load).await);
    assert_eq!(denied.initialized.load(Ordering::SeqCst), 0);
    assert_eq!(denied.denied.load(Ordering::SeqCst), 1);
}

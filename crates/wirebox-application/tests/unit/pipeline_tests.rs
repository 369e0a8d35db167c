//! Tests for resolve pipeline assembly and execution order

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wirebox_application::{
    ComponentRegistration, DelegateMiddleware, MiddlewareInsertionMode, PipelinePhase,
    ResolveMiddleware, ResolvePipelineBuilder, ServicesTracker,
};
use wirebox_domain::{Service, TypeDescriptor};

use crate::common::{as_text, counting_registration, root_scope, text, text_registration};

fn passthrough(name: &str, phase: PipelinePhase) -> Arc<dyn ResolveMiddleware> {
    Arc::new(DelegateMiddleware::new(name, phase, |ctx, next| next.run(ctx)))
}

fn names(middleware: &[Arc<dyn ResolveMiddleware>]) -> Vec<String> {
    middleware.iter().map(|m| m.to_string()).collect()
}

fn widget() -> Service {
    Service::typed(TypeDescriptor::named("Widget"))
}

fn gadget() -> Service {
    Service::typed(TypeDescriptor::named("Gadget"))
}

#[test]
fn test_builder_orders_by_phase() {
    let mut builder = ResolvePipelineBuilder::new();
    builder
        .use_middleware(
            passthrough("activate", PipelinePhase::Activation),
            MiddlewareInsertionMode::EndOfPhase,
        )
        .use_middleware(
            passthrough("start", PipelinePhase::ResolveRequestStart),
            MiddlewareInsertionMode::EndOfPhase,
        )
        .use_middleware(
            passthrough("share", PipelinePhase::Sharing),
            MiddlewareInsertionMode::EndOfPhase,
        );

    assert_eq!(names(builder.middleware()), vec!["start", "share", "activate"]);
}

#[test]
fn test_insertion_mode_within_phase() {
    let mut builder = ResolvePipelineBuilder::new();
    builder.use_middleware_list(
        [
            passthrough("end-1", PipelinePhase::Decoration),
            passthrough("end-2", PipelinePhase::Decoration),
        ],
        MiddlewareInsertionMode::EndOfPhase,
    );
    builder.use_middleware_list(
        [
            passthrough("start-1", PipelinePhase::Decoration),
            passthrough("start-2", PipelinePhase::Decoration),
        ],
        MiddlewareInsertionMode::StartOfPhase,
    );
    builder.use_middleware(
        passthrough("sharing", PipelinePhase::Sharing),
        MiddlewareInsertionMode::StartOfPhase,
    );
    builder.use_middleware(
        passthrough("scope", PipelinePhase::ScopeSelection),
        MiddlewareInsertionMode::EndOfPhase,
    );

    assert_eq!(
        names(builder.middleware()),
        vec!["scope", "start-2", "start-1", "end-1", "end-2", "sharing"]
    );
}

#[test]
fn test_cloned_builder_is_independent() {
    let mut original = ResolvePipelineBuilder::new();
    original.use_middleware(
        passthrough("shared", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    );
    let mut copy = original.clone();
    copy.use_middleware(
        passthrough("copy-only", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    );

    assert_eq!(original.middleware().len(), 1);
    assert_eq!(copy.middleware().len(), 2);
    assert_eq!(original.build().middleware().len(), 1);
}

#[test]
fn test_merged_builder_keeps_modes_and_relative_order() {
    let mut other = ResolvePipelineBuilder::new();
    other
        .use_middleware(
            passthrough("start-1", PipelinePhase::Decoration),
            MiddlewareInsertionMode::StartOfPhase,
        )
        .use_middleware(
            passthrough("start-2", PipelinePhase::Decoration),
            MiddlewareInsertionMode::StartOfPhase,
        )
        .use_middleware(
            passthrough("end-1", PipelinePhase::Decoration),
            MiddlewareInsertionMode::EndOfPhase,
        )
        .use_middleware(
            passthrough("end-2", PipelinePhase::Decoration),
            MiddlewareInsertionMode::EndOfPhase,
        );

    let mut builder = ResolvePipelineBuilder::new();
    builder.use_middleware(
        passthrough("mine", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    );
    builder.use_builder(&other);

    assert_eq!(
        names(builder.middleware()),
        vec!["start-2", "start-1", "mine", "end-1", "end-2"]
    );
    assert_eq!(
        builder.insertion_modes(),
        [
            MiddlewareInsertionMode::StartOfPhase,
            MiddlewareInsertionMode::StartOfPhase,
            MiddlewareInsertionMode::EndOfPhase,
            MiddlewareInsertionMode::EndOfPhase,
            MiddlewareInsertionMode::EndOfPhase,
        ]
    );
}

#[test]
fn test_service_start_of_phase_precedes_registration_end_of_phase() {
    let tracker = ServicesTracker::new();
    tracker.add_service_middleware(
        &widget(),
        passthrough("svc-start", PipelinePhase::Decoration),
        MiddlewareInsertionMode::StartOfPhase,
    );
    tracker.add_service_middleware(
        &widget(),
        passthrough("svc-end", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    );

    let mut own = ResolvePipelineBuilder::new();
    own.use_middleware(
        passthrough("own-end", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    )
    .use_middleware(
        passthrough("own-start", PipelinePhase::Decoration),
        MiddlewareInsertionMode::StartOfPhase,
    );
    let registration = text_registration("Widget", "w", [widget()]).with_pipeline_builder(own);

    let pipeline = registration.resolve_pipeline(&widget(), &tracker);
    assert_eq!(
        names(pipeline.middleware()),
        vec![
            "svc-start",
            "own-start",
            "own-end",
            "svc-end",
            "SharingMiddleware",
            "ActivatorMiddleware(Widget)",
        ]
    );
}

#[test]
fn test_service_middleware_only_runs_for_its_service() {
    let tracker = Arc::new(ServicesTracker::new());
    let widget_runs = Arc::new(AtomicUsize::new(0));
    let runs = widget_runs.clone();
    tracker.add_service_middleware(
        &widget(),
        Arc::new(DelegateMiddleware::new(
            "widget-only",
            PipelinePhase::Decoration,
            move |ctx, next| {
                runs.fetch_add(1, Ordering::SeqCst);
                next.run(ctx)
            },
        )),
        MiddlewareInsertionMode::EndOfPhase,
    );
    let registration = Arc::new(text_registration("Both", "both", [widget(), gadget()]));
    tracker.add_registration(registration.clone(), false, false).unwrap();

    let scope = root_scope(&tracker);
    assert_eq!(as_text(&scope.resolve_service(&gadget()).unwrap()), "both");
    assert_eq!(widget_runs.load(Ordering::SeqCst), 0);
    assert!(registration.is_pipeline_built(&gadget()));
    assert!(!registration.is_pipeline_built(&widget()));

    assert_eq!(as_text(&scope.resolve_service(&widget()).unwrap()), "both");
    assert_eq!(widget_runs.load(Ordering::SeqCst), 1);

    assert_eq!(
        names(registration.resolve_pipeline(&gadget(), tracker.as_ref()).middleware()),
        vec!["SharingMiddleware", "ActivatorMiddleware(Both)"]
    );
}

#[test]
fn test_registration_pipeline_merges_stock_and_service_middleware() {
    let tracker = ServicesTracker::new();
    tracker.add_service_middleware(
        &widget(),
        passthrough("service-decoration", PipelinePhase::Decoration),
        MiddlewareInsertionMode::EndOfPhase,
    );

    let mut own = ResolvePipelineBuilder::new();
    own.use_middleware(
        passthrough("own-parameters", PipelinePhase::ParameterSelection),
        MiddlewareInsertionMode::EndOfPhase,
    );
    let registration = text_registration("Widget", "w", [widget()]).with_pipeline_builder(own);

    assert!(!registration.is_pipeline_built(&widget()));
    let pipeline = registration.resolve_pipeline(&widget(), &tracker);
    assert!(registration.is_pipeline_built(&widget()));

    assert_eq!(
        names(pipeline.middleware()),
        vec![
            "service-decoration",
            "SharingMiddleware",
            "own-parameters",
            "ActivatorMiddleware(Widget)",
        ]
    );
}

#[test]
fn test_middleware_runs_onion_style() {
    let tracker = Arc::new(ServicesTracker::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    for (name, phase) in [
        ("outer", PipelinePhase::ResolveRequestStart),
        ("inner", PipelinePhase::Decoration),
    ] {
        let log = log.clone();
        tracker.add_service_middleware(
            &widget(),
            Arc::new(DelegateMiddleware::new(name, phase, move |ctx, next| {
                log.lock().unwrap().push(format!("enter {name}"));
                let result = next.run(ctx);
                log.lock().unwrap().push(format!("exit {name}"));
                result
            })),
            MiddlewareInsertionMode::EndOfPhase,
        );
    }
    tracker
        .add_registration(Arc::new(text_registration("Widget", "w", [widget()])), false, false)
        .unwrap();

    let instance = root_scope(&tracker).resolve_service(&widget()).unwrap();
    assert_eq!(as_text(&instance), "w");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["enter outer", "enter inner", "exit inner", "exit outer"]
    );
}

#[test]
fn test_middleware_can_short_circuit() {
    let tracker = Arc::new(ServicesTracker::new());
    let activations = Arc::new(AtomicUsize::new(0));
    tracker.add_service_middleware(
        &widget(),
        Arc::new(DelegateMiddleware::new(
            "canned",
            PipelinePhase::Decoration,
            |ctx, _next| {
                ctx.set_instance(text("canned"));
                Ok(())
            },
        )),
        MiddlewareInsertionMode::EndOfPhase,
    );
    tracker
        .add_registration(
            Arc::new(counting_registration("Widget", activations.clone(), vec![widget()])),
            false,
            false,
        )
        .unwrap();

    let instance = root_scope(&tracker).resolve_service(&widget()).unwrap();
    assert_eq!(as_text(&instance), "canned");
    assert_eq!(activations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_middleware_can_replace_instance() {
    let tracker = Arc::new(ServicesTracker::new());
    tracker.add_service_middleware(
        &widget(),
        Arc::new(DelegateMiddleware::new(
            "wrap",
            PipelinePhase::Decoration,
            |ctx, next| {
                next.run(ctx)?;
                let inner = ctx.instance().map(as_text).unwrap_or_default();
                ctx.set_instance(text(&format!("wrapped({inner})")));
                Ok(())
            },
        )),
        MiddlewareInsertionMode::EndOfPhase,
    );
    tracker
        .add_registration(Arc::new(text_registration("Widget", "w", [widget()])), false, false)
        .unwrap();

    let instance = root_scope(&tracker).resolve_service(&widget()).unwrap();
    assert_eq!(as_text(&instance), "wrapped(w)");
}

#[test]
fn test_registration_display() {
    let registration: ComponentRegistration = text_registration("Widget", "w", [widget()]);
    assert_eq!(
        registration.to_string(),
        "Activator = Widget, Services = [Widget], Sharing = unique-per-request, Origin = explicit"
    );
}

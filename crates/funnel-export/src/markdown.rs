//! Markdown rendering of a project and its resolved entities.
//!
//! Optional fields are rendered only when present; nothing is emitted for an
//! absent field or an empty list.

use funnel_types::{
    AidaFunnel, ContentFunnel, ConversionFunnel, CustomerJourney, Entity, EntityBody, Project,
    ResearchMetadata,
};

/// Render a project and its entities as Markdown.
pub fn render_markdown(project: &Project, entities: &[Entity]) -> String {
    let mut doc = Doc::default();
    doc.heading(1, &project.name);
    doc.opt_paragraph(project.description.as_deref());
    if !project.tags.is_empty() {
        doc.paragraph(&format!("**Tags:** {}", project.tags.join(", ")));
    }

    for entity in entities {
        render_entity(&mut doc, entity);
    }
    doc.finish()
}

fn render_entity(doc: &mut Doc, entity: &Entity) {
    let kind = entity.kind();
    doc.heading(2, &entity.name);
    doc.paragraph(&format!("*{}* (`{}`)", kind.label(), kind));
    doc.opt_paragraph(entity.description.as_deref());

    match &entity.body {
        EntityBody::AidaFunnel(aida) => render_aida(doc, aida),
        EntityBody::ContentFunnel(content) => render_content(doc, content),
        EntityBody::ConversionFunnel(conversion) => render_conversion(doc, conversion),
        EntityBody::CustomerJourney(journey) => render_journey(doc, journey),
    }

    if let Some(research) = entity.research_metadata.as_ref().filter(|r| !r.is_empty()) {
        render_research(doc, research);
    }
}

fn render_aida(doc: &mut Doc, aida: &AidaFunnel) {
    doc.opt_field("Product", aida.product.as_deref());
    doc.opt_field("Target audience", aida.target_audience.as_deref());
    for (name, stage) in aida.stages() {
        if stage.is_empty() {
            continue;
        }
        doc.heading(3, name);
        doc.opt_field("Objective", stage.objective.as_deref());
        doc.list("Tactics", &stage.tactics);
        doc.list("Channels", &stage.channels);
        doc.list("Metrics", &stage.metrics);
    }
}

fn render_content(doc: &mut Doc, content: &ContentFunnel) {
    doc.opt_field("Topic", content.topic.as_deref());
    doc.opt_field("Target audience", content.target_audience.as_deref());
    if content.stages.is_empty() {
        return;
    }
    doc.heading(3, "Stages");
    for stage in &content.stages {
        doc.heading(4, &stage.name);
        doc.opt_field("Goal", stage.goal.as_deref());
        doc.list("Content types", &stage.content_types);
        doc.list("Channels", &stage.channels);
        doc.list("Calls to action", &stage.calls_to_action);
    }
}

fn render_conversion(doc: &mut Doc, conversion: &ConversionFunnel) {
    doc.opt_field("Goal", conversion.goal.as_deref());
    if let Some(rate) = conversion.overall_conversion_rate {
        doc.field("Overall conversion rate", &percent(rate));
    }
    if conversion.stages.is_empty() {
        return;
    }
    doc.heading(3, "Stages");
    for (i, stage) in conversion.stages.iter().enumerate() {
        doc.heading(4, &format!("{}. {}", i + 1, stage.name));
        if let Some(rate) = stage.conversion_rate {
            doc.field("Conversion rate", &percent(rate));
        }
        doc.opt_paragraph(stage.description.as_deref());
        doc.list("Drop-off reasons", &stage.drop_off_reasons);
        doc.list("Optimizations", &stage.optimizations);
    }
}

fn render_journey(doc: &mut Doc, journey: &CustomerJourney) {
    if let Some(persona) = &journey.persona {
        doc.heading(3, &format!("Persona: {}", persona.name));
        doc.opt_paragraph(persona.description.as_deref());
        doc.list("Goals", &persona.goals);
        doc.list("Pain points", &persona.pain_points);
    }
    if journey.phases.is_empty() {
        return;
    }
    doc.heading(3, "Phases");
    for phase in &journey.phases {
        doc.heading(4, &phase.name);
        doc.opt_paragraph(phase.description.as_deref());
        let touchpoints: Vec<String> = phase
            .touchpoints
            .iter()
            .map(|t| match &t.description {
                Some(d) => format!("{}: {d}", t.channel),
                None => t.channel.clone(),
            })
            .collect();
        doc.list("Touchpoints", &touchpoints);
        doc.list("Emotions", &phase.emotions);
        doc.list("Pain points", &phase.pain_points);
        doc.list("Opportunities", &phase.opportunities);
    }
}

fn render_research(doc: &mut Doc, research: &ResearchMetadata) {
    doc.heading(3, "Research");
    if let Some(score) = research.confidence_score {
        doc.field("Confidence", &percent(score * 100.0));
    }
    doc.opt_field("Source", research.source.as_deref());
    doc.opt_field("Researched", research.researched_at.as_deref());
    let citations: Vec<String> = research
        .citations
        .iter()
        .map(|c| {
            let title = if c.title.is_empty() { &c.url } else { &c.title };
            match &c.accessed_at {
                Some(at) => format!("[{title}]({}) (accessed {at})", c.url),
                None => format!("[{title}]({})", c.url),
            }
        })
        .collect();
    doc.list("Citations", &citations);
}

/// Percent with at most one decimal place: `50%`, `12.5%`.
fn percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}

/// Line-oriented Markdown builder. Blocks are separated by one blank line.
#[derive(Default)]
struct Doc {
    out: String,
}

impl Doc {
    fn block(&mut self, text: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn heading(&mut self, level: usize, text: &str) {
        self.block(&format!("{} {}", "#".repeat(level), single_line(text)));
    }

    /// Free text may span lines; a line that would open a heading is escaped.
    fn paragraph(&mut self, text: &str) {
        let escaped: Vec<String> = text
            .lines()
            .map(|line| {
                if line.trim_start().starts_with('#') {
                    format!("\\{}", line.trim_start())
                } else {
                    line.to_string()
                }
            })
            .collect();
        self.block(&escaped.join("\n"));
    }

    fn opt_paragraph(&mut self, text: Option<&str>) {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.paragraph(text);
        }
    }

    fn field(&mut self, label: &str, value: &str) {
        self.block(&format!("**{label}:** {}", single_line(value)));
    }

    fn opt_field(&mut self, label: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.field(label, value);
        }
    }

    fn list(&mut self, label: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let mut text = format!("**{label}:**\n");
        for item in items {
            text.push_str("- ");
            text.push_str(&single_line(item));
            text.push('\n');
        }
        text.pop();
        self.block(&text);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Join the lines of a value used in a heading, field or bullet with spaces.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_types::{
        AidaStage, Citation, ContentStage, ConversionStage, JourneyPhase, NewEntity, Persona,
        Touchpoint,
    };

    fn entity(project: &Project, name: &str, body: EntityBody) -> Entity {
        Entity::from_new(project.id.clone(), NewEntity::new(name, body))
    }

    #[test]
    fn project_heading_description_and_tags() {
        let project = Project::new(
            "Export Test",
            Some("Q3 launch".into()),
            vec!["b2b".into(), "saas".into()],
        );
        let md = render_markdown(&project, &[]);
        assert_eq!(md, "# Export Test\n\nQ3 launch\n\n**Tags:** b2b, saas\n");
    }

    #[test]
    fn absent_optionals_emit_nothing() {
        let project = Project::new("Bare", None, vec![]);
        let e = entity(
            &project,
            "Empty AIDA",
            EntityBody::AidaFunnel(AidaFunnel::default()),
        );
        let md = render_markdown(&project, &[e]);
        assert_eq!(md, "# Bare\n\n## Empty AIDA\n\n*AIDA Funnel* (`aida-funnel`)\n");
    }

    #[test]
    fn conversion_stages_and_rates() {
        let project = Project::new("Export Test", None, vec![]);
        let e = entity(
            &project,
            "Signup",
            EntityBody::ConversionFunnel(ConversionFunnel {
                goal: None,
                overall_conversion_rate: Some(15.0),
                stages: vec![
                    ConversionStage::named("Awareness").with_rate(50.0),
                    ConversionStage {
                        drop_off_reasons: vec!["pricing unclear".into()],
                        ..ConversionStage::named("Interest").with_rate(30.0)
                    },
                ],
                ..Default::default()
            }),
        );
        let md = render_markdown(&project, &[e]);
        assert!(md.starts_with("# Export Test\n"));
        assert!(md.contains("**Overall conversion rate:** 15%"));
        assert!(md.contains("#### 1. Awareness\n\n**Conversion rate:** 50%"));
        assert!(md.contains("#### 2. Interest\n\n**Conversion rate:** 30%"));
        assert!(md.contains("**Drop-off reasons:**\n- pricing unclear\n"));
        assert!(!md.contains("Optimizations"));
    }

    #[test]
    fn aida_skips_empty_stages() {
        let project = Project::new("P", None, vec![]);
        let e = entity(
            &project,
            "Launch",
            EntityBody::AidaFunnel(AidaFunnel {
                product: Some("Widget".into()),
                desire: AidaStage {
                    objective: Some("Show ROI".into()),
                    tactics: vec!["case studies".into()],
                    ..Default::default()
                },
                ..Default::default()
            }),
        );
        let md = render_markdown(&project, &[e]);
        assert!(md.contains("**Product:** Widget"));
        assert!(md.contains("### Desire\n\n**Objective:** Show ROI\n\n**Tactics:**\n- case studies\n"));
        assert!(!md.contains("### Attention"));
    }

    #[test]
    fn content_and_journey_sections() {
        let project = Project::new("P", None, vec![]);
        let content = entity(
            &project,
            "Editorial",
            EntityBody::ContentFunnel(ContentFunnel {
                topic: Some("Observability".into()),
                stages: vec![ContentStage {
                    name: "TOFU".into(),
                    content_types: vec!["blog".into(), "podcast".into()],
                    ..Default::default()
                }],
                ..Default::default()
            }),
        );
        let journey = entity(
            &project,
            "Buyer",
            EntityBody::CustomerJourney(CustomerJourney {
                persona: Some(Persona {
                    name: "Ops Olivia".into(),
                    goals: vec!["fewer pages".into()],
                    ..Default::default()
                }),
                phases: vec![JourneyPhase {
                    name: "Discover".into(),
                    touchpoints: vec![
                        Touchpoint {
                            channel: "search".into(),
                            description: Some("compares vendors".into()),
                            ..Default::default()
                        },
                        Touchpoint {
                            channel: "peer referral".into(),
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            }),
        );
        let md = render_markdown(&project, &[content, journey]);
        assert!(md.contains("**Topic:** Observability"));
        assert!(md.contains("#### TOFU\n\n**Content types:**\n- blog\n- podcast\n"));
        assert!(md.contains("### Persona: Ops Olivia"));
        assert!(md.contains("- search: compares vendors\n- peer referral\n"));
        assert!(md.find("## Editorial").unwrap() < md.find("## Buyer").unwrap());
    }

    #[test]
    fn research_section() {
        let project = Project::new("P", None, vec![]);
        let mut e = entity(
            &project,
            "Researched",
            EntityBody::ConversionFunnel(ConversionFunnel::default()),
        );
        e.research_metadata = Some(ResearchMetadata {
            citations: vec![Citation {
                id: "c1".into(),
                title: "Benchmarks 2026".into(),
                url: "https://example.com/bench".into(),
                accessed_at: Some("2026-01-02".into()),
                relevant_fields: vec!["stages".into()],
                ..Default::default()
            }],
            confidence_score: Some(0.85),
            source: Some("web research".into()),
            ..Default::default()
        });
        let md = render_markdown(&project, &[e]);
        assert!(md.contains("### Research\n\n**Confidence:** 85%\n\n**Source:** web research"));
        assert!(md.contains("- [Benchmarks 2026](https://example.com/bench) (accessed 2026-01-02)"));
        assert!(!md.contains("Researched:"));
    }

    #[test]
    fn multi_line_values_keep_document_structure() {
        let project = Project::new(
            "Launch\n# plan",
            Some("First line\n# not a heading".into()),
            vec![],
        );
        let e = entity(
            &project,
            "Signup\nflow",
            EntityBody::ConversionFunnel(ConversionFunnel {
                stages: vec![ConversionStage {
                    drop_off_reasons: vec!["too\nslow".into()],
                    ..ConversionStage::named("Top\n## Bottom")
                }],
                ..Default::default()
            }),
        );
        let md = render_markdown(&project, &[e]);
        assert!(md.starts_with("# Launch # plan\n\nFirst line\n\\# not a heading\n"));
        assert!(md.contains("## Signup flow\n"));
        assert!(md.contains("#### 1. Top ## Bottom\n"));
        assert!(md.contains("- too slow"));
        let headings: Vec<_> = md.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(headings.len(), 4, "{headings:?}");
    }

    #[test]
    fn empty_research_is_not_rendered() {
        let project = Project::new("P", None, vec![]);
        let mut e = entity(
            &project,
            "E",
            EntityBody::AidaFunnel(AidaFunnel::default()),
        );
        e.research_metadata = Some(ResearchMetadata::default());
        assert!(!render_markdown(&project, &[e]).contains("Research"));
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(percent(50.0), "50%");
        assert_eq!(percent(12.5), "12.5%");
        assert_eq!(percent(0.85 * 100.0), "85%");
        assert_eq!(percent(33.333), "33.3%");
    }
}

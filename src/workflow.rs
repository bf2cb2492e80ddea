use anyhow::Result;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::Dispatcher;
use crate::state::{CheckpointVerification, Debate, ProjectState, QuestionAnswer};
use crate::validate::string_list_or_repair;

/// Last-resort checklist when no backend produced one and the repair pass
/// failed as well.
pub const DEFAULT_CHECKLIST: [&str; 5] = [
    "Technical feasibility assessment",
    "Financial viability analysis",
    "Regulatory compliance check",
    "Resource availability confirmation",
    "Market demand validation",
];

/// Where free-text user answers come from.
///
/// The interactive run reads stdin; tests script the answers.
pub trait AnswerSource {
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Blocking stdin-backed answer source for the interactive CLI.
pub struct StdinAnswers;

impl AnswerSource for StdinAnswers {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Run the full four-step assessment and return the collected state.
///
/// Every step degrades gracefully: a stage that cannot run records an
/// explicit skip placeholder and lets the later stages short-circuit through
/// their own gates, so the final report always says which stages ran.
pub async fn run(
    dispatcher: &Dispatcher,
    answers: &mut dyn AnswerSource,
    industry: Option<String>,
) -> Result<ProjectState> {
    let mut state = ProjectState::new();

    step_1_define_checklist(dispatcher, answers, &mut state, industry).await?;

    if state.checklist_criteria.is_empty() {
        error!("Workflow halted due to issues in Step 1: Unable to generate valid checklist criteria.");
        state.gemini_analysis_report = "Skipped due to checklist failure.".to_string();
        state.debate = Debate {
            pro_argument_ollama: "Skipped".to_string(),
            against_argument_gemini: "Skipped".to_string(),
        };
        state.final_conclusion = "Reconsider: Workflow halted early.".to_string();
        return Ok(state);
    }

    step_2_verify_checklist(dispatcher, answers, &mut state).await?;
    step_3_debate_simulation(dispatcher, &mut state).await;
    step_4_final_conclusion(dispatcher, &mut state).await;

    Ok(state)
}

/// Step 1: ask for the industry and have a backend draft the checklist.
pub async fn step_1_define_checklist(
    dispatcher: &Dispatcher,
    answers: &mut dyn AnswerSource,
    state: &mut ProjectState,
    industry: Option<String>,
) -> Result<()> {
    info!("--- 1. Define the Checklist Criteria ---");

    let industry = match industry {
        Some(industry) if !industry.is_empty() => industry,
        _ => answers.ask(
            "Please enter the industry for the software project (e.g., 'FinTech', 'Healthcare', 'E-commerce'): ",
        )?,
    };
    state.industry = industry.clone();

    let prompt = format!(
        r#"You are an AI assistant helping to define project readiness checklists.
For a project in the '{industry}' industry/domain, generate a structured list of 3-5 key checkpoints
that must be met before proceeding.
Focus on high-level categories like: financial feasibility, regulatory compliance, technical readiness.

Example for 'software project': Scalability, security compliance, API integrations.
Example for 'healthcare AI solution': FDA approval, patient data protection, ethical AI use.

Output the list as a JSON array of strings. For example:
["Checkpoint 1", "Checkpoint 2", "Checkpoint 3"]"#
    );

    let raw_checklist = dispatcher.dispatch(&prompt).await;
    info!("Raw response for checklist: {:?}", raw_checklist);

    let repair_context = format!("a '{}' project", industry);
    state.checklist_criteria = match string_list_or_repair(
        dispatcher,
        raw_checklist.as_deref(),
        &repair_context,
    )
    .await
    {
        Ok(items) => items,
        Err(e) => {
            error!(
                "Failed to produce a valid JSON checklist even after cleanup: {}. Using the default list.",
                e
            );
            DEFAULT_CHECKLIST.iter().map(|s| s.to_string()).collect()
        }
    };

    println!("\nGenerated Checklist Criteria:");
    for (i, item) in state.checklist_criteria.iter().enumerate() {
        println!("   {}. {}", i + 1, item);
    }

    Ok(())
}

/// Step 2: per-checkpoint validation questions, user answers, and one
/// primary-backend analysis over the whole transcript.
pub async fn step_2_verify_checklist(
    dispatcher: &Dispatcher,
    answers: &mut dyn AnswerSource,
    state: &mut ProjectState,
) -> Result<()> {
    info!("--- 2. Multiprompt Verification & Data Analysis ---");

    if state.checklist_criteria.is_empty() {
        error!("Cannot proceed: Checklist criteria not defined or error in definition.");
        state.gemini_analysis_report = "Skipped: Checklist definition failed.".to_string();
        return Ok(());
    }

    let mut transcript = Vec::new();

    let checklist = state.checklist_criteria.clone();
    for (i, item) in checklist.iter().enumerate() {
        println!("\nVerifying Checkpoint {}: {}", i + 1, item);

        let prompt_questions = format!(
            r#"For the project checklist item: '{item}' in a '{industry}' context,
generate 2-3 specific validation questions to assess if this checkpoint is met.
Frame them as direct questions the user should answer.
Output as a JSON array of strings. Example:
["Question 1?", "Question 2?"]"#,
            item = item,
            industry = state.industry,
        );

        let raw_questions = dispatcher.dispatch(&prompt_questions).await;
        info!("Raw response for questions: {:?}", raw_questions);

        let repair_context = format!("validation questions for the checklist item '{}'", item);
        let questions = match string_list_or_repair(
            dispatcher,
            raw_questions.as_deref(),
            &repair_context,
        )
        .await
        {
            Ok(questions) => questions,
            Err(e) => {
                warn!("No valid JSON questions: {}. Using generic questions.", e);
                vec![
                    format!("What is the status of '{}'?", item),
                    format!("What evidence supports the completion of '{}'?", item),
                ]
            }
        };

        let mut record = CheckpointVerification {
            checkpoint: item.clone(),
            questions: questions.clone(),
            answers: Vec::new(),
        };

        for (q_idx, question) in questions.iter().enumerate() {
            let answer = answers.ask(&format!("    Q{}: {}\n   Your Answer: ", q_idx + 1, question))?;
            transcript.push(format!("For '{}', Q: {} A: {}", item, question, answer));
            record.answers.push(QuestionAnswer {
                question: question.clone(),
                answer,
            });
            // Small pacing pause between questions.
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        state.verification_results.insert(item.clone(), record);
    }

    let prompt_analysis = format!(
        r#"Project Type: {industry}
Checklist Criteria and User Answers:
{transcript}

Based on the user's answers:
1. Analyze the provided information for each checkpoint.
2. Briefly "cross-reference" against common knowledge of outcomes or best practices for such projects.
   (e.g., "The financial projections seem optimistic given typical market entry costs for similar SaaS products.")
3. Provide a short (1-2 sentence) assessment for each checkpoint (e.g., "Seems well-addressed", "Requires more detail", "Potential risk area").
4. Provide an overall brief summary statement about the project's current state based on these answers.

Output your analysis clearly, perhaps point by point for each checkpoint, and then the overall summary."#,
        industry = state.industry,
        transcript = transcript.join("\n"),
    );

    info!("Asking the primary backend to analyze answers and simulate cross-referencing...");
    state.gemini_analysis_report = dispatcher
        .dispatch_primary(&prompt_analysis)
        .await
        .unwrap_or_else(|| "Gemini failed to provide analysis.".to_string());

    println!("\nAnalysis Report:");
    println!("{}", state.gemini_analysis_report);

    Ok(())
}

/// Step 3: two-persona debate. The "pro" persona is pinned to the local
/// backend with no fallback; the "against" persona goes to the primary.
pub async fn step_3_debate_simulation(dispatcher: &Dispatcher, state: &mut ProjectState) {
    info!("--- 3. Counterargument Simulation - Debate Between Two AI Personas ---");

    if state.checklist_criteria.is_empty()
        || state.gemini_analysis_report.is_empty()
        || state.gemini_analysis_report.contains("Skipped")
    {
        warn!("Cannot proceed with debate: Checklist or analysis report missing/skipped.");
        state.debate = Debate {
            pro_argument_ollama: "Skipped".to_string(),
            against_argument_gemini: "Skipped due to missing prior data.".to_string(),
        };
        return;
    }

    let verification_json = serde_json::to_string_pretty(&state.verification_results)
        .unwrap_or_else(|_| "{}".to_string());
    let project_summary = format!(
        r#"Project Type: {industry}
Current Status & Analysis:
{verification}
Gemini's Initial Analysis: {report}"#,
        industry = state.industry,
        verification = verification_json,
        report = state.gemini_analysis_report,
    );

    let prompt_pro = format!(
        r#"You are Persona A, an optimistic but realistic project advocate.
Given the following project summary, argue WHY the project should proceed.
Address potential risks highlighted in the analysis by offering potential solutions or mitigations.
Keep your argument concise (2-3 key points).

Project Summary:
{project_summary}

Your Pro-Project Argument:"#
    );

    info!("Asking the local backend for the Pro-Project argument (Persona A)...");
    let pro_argument = match dispatcher.dispatch_local(&prompt_pro).await {
        Some(text) => text,
        None => {
            warn!("Local backend did not provide a pro-argument.");
            "Pro-argument (Ollama) not available or failed.".to_string()
        }
    };

    println!("\nPersona A (Pro-Project - Ollama):");
    println!("{}", pro_argument);

    let prompt_against = format!(
        r#"You are Persona B, a cautious and critical project evaluator.
Given the following project summary AND the Pro-Project argument (if available), highlight critical challenges,
unaddressed risks, or reasons why the project might fail or needs significant reconsideration.
Recommend caution if necessary. Keep your argument concise (2-3 key points).

Project Summary:
{project_summary}

Persona A's Pro-Project Argument:
{pro_argument}

Your Critical Counter-Argument (Persona B):"#
    );

    info!("Asking the primary backend for the Against-Project argument (Persona B)...");
    let against_argument = dispatcher
        .dispatch_primary(&prompt_against)
        .await
        .unwrap_or_else(|| "Gemini failed to provide counter-argument.".to_string());

    println!("\nPersona B (Against-Project - Gemini):");
    println!("{}", against_argument);

    state.debate = Debate {
        pro_argument_ollama: pro_argument,
        against_argument_gemini: against_argument,
    };
}

/// Step 4: one primary-backend prompt over everything collected so far. The
/// response is stored verbatim; it is expected (not enforced) to begin with
/// "CONCLUSION: PROCEED" or "CONCLUSION: RECONSIDER".
pub async fn step_4_final_conclusion(dispatcher: &Dispatcher, state: &mut ProjectState) {
    info!("--- 4. AI-Generated Conclusion - Proceed or Reconsider? ---");

    // Only a skipped debate blocks the conclusion; a pro argument recorded as
    // "not available" still flows in as context.
    if state.debate.pro_argument_ollama.contains("Skipped")
        || state.debate.against_argument_gemini.contains("Skipped")
    {
        warn!("Cannot proceed with final conclusion: Debate simulation missing or skipped.");
        state.final_conclusion =
            "Reconsider: Debate simulation was not performed or failed.".to_string();
        return;
    }

    let verification_json = serde_json::to_string_pretty(&state.verification_results)
        .unwrap_or_else(|_| "{}".to_string());
    let conclusion_input = format!(
        r#"Project Type: {industry}
Checklist Verification Summary: {verification}
Initial Gemini Analysis: {report}
Debate:
  Pro-Project (Ollama): {pro}
  Against-Project (Gemini): {against}

Based on ALL the information above (checklist results, initial analysis, and the simulated debate),
provide a final recommendation: Should the project PROCEED or RECONSIDER?

If PROCEED:
  - Briefly confirm feasibility.
  - Suggest 1-2 high-level next execution steps.
If RECONSIDER:
  - Clearly identify the 1-2 most critical flaws or risks.
  - Suggest specific modifications or alternative approaches.

Be decisive but base your recommendation on the provided evidence.
Start your response with either "CONCLUSION: PROCEED" or "CONCLUSION: RECONSIDER"."#,
        industry = state.industry,
        verification = verification_json,
        report = state.gemini_analysis_report,
        pro = state.debate.pro_argument_ollama,
        against = state.debate.against_argument_gemini,
    );

    info!("Asking the primary backend for the final conclusion...");
    state.final_conclusion = dispatcher
        .dispatch_primary(&conclusion_input)
        .await
        .unwrap_or_else(|| "Gemini failed to provide a final conclusion.".to_string());

    println!("\nAI's Final Recommendation (Gemini):");
    println!("{}", state.final_conclusion);
}

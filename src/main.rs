//! Loan Position Engine Simulation.
//!
//! Walks a delegated loan through its full lifecycle: configuration, principal
//! top-ups, borrower draws, repayment, incidental-asset reconciliation, and
//! closure with a realized write-off.

use arbloan_core::*;
use rust_decimal_macros::dec;

const NATIVE: AssetId = AssetId(1);
const WNATIVE: AssetId = AssetId(2);
const USDC: AssetId = AssetId(3);
const REWARD: AssetId = AssetId(4);

const MANAGER: AccountId = AccountId(1);
const BORROWER: AccountId = AccountId(2);
const VAULT: AccountId = AccountId(3);
const CUSTODY: AccountId = AccountId(4);

fn main() {
    println!("Loan Position Accounting Engine Simulation");
    println!("Single Loan, Single Asset, Full Lifecycle\n");

    scenario_1_shell_loan();
    scenario_2_draw_and_repay();
    scenario_3_reconcile_rewards();
    scenario_4_close_with_write_off();

    println!("\nAll simulations completed successfully.");
}

fn new_engine(vault_seed: rust_decimal::Decimal) -> LoanEngine<InMemoryLedger> {
    let mut ledger = InMemoryLedger::new(NATIVE, WNATIVE);
    ledger.mint(USDC, VAULT, Amount::new_unchecked(vault_seed));
    let mut engine = LoanEngine::new(
        EngineConfig::default(),
        ledger,
        Box::new(SingleManager::new(MANAGER)),
        CUSTODY,
        VAULT,
    );
    engine.set_time(Timestamp::now());
    engine
}

fn print_valuation(engine: &LoanEngine<InMemoryLedger>) {
    let (assets, amounts) = engine.get_managed_assets();
    if assets.is_empty() {
        println!("    Managed value: (empty)");
    } else {
        println!("    Managed value: {} of {}", amounts[0], assets[0]);
    }
}

/// A loan configured with zero principal, topped up later.
fn scenario_1_shell_loan() {
    println!("Scenario 1: Shell Loan and Top-Up\n");

    let mut engine = new_engine(dec!(1000));

    engine
        .configure_loan(
            MANAGER,
            LoanTerms::new(BORROWER, USDC, Amount::ZERO).with_description("shell"),
        )
        .unwrap();
    println!("  Configured with zero principal");
    print_valuation(&engine);

    engine
        .update_borrowable_amount(MANAGER, SignedAmount::new(dec!(500)))
        .unwrap();
    println!("  Topped up by 500");
    print_valuation(&engine);

    engine
        .update_borrowable_amount(MANAGER, SignedAmount::new(dec!(-200)))
        .unwrap();
    println!("  Drew down 200 back to the vault");
    print_valuation(&engine);

    let vault_balance = engine.gateway().balance_of(USDC, VAULT);
    println!("  Vault balance: {}\n", vault_balance);
}

/// Partial draws and a max repayment.
fn scenario_2_draw_and_repay() {
    println!("Scenario 2: Draws and Max Repayment\n");

    let mut engine = new_engine(dec!(1000));
    engine
        .configure_loan(MANAGER, LoanTerms::new(BORROWER, USDC, Amount::new_unchecked(dec!(400))))
        .unwrap();

    engine.borrow(BORROWER, Amount::new_unchecked(dec!(100))).unwrap();
    println!("  Borrower drew 100");
    print_valuation(&engine);

    // a day passes before the first repayment
    engine.advance_time(86_400_000);
    engine
        .repay(BORROWER, RepayAmount::Exact(Amount::new_unchecked(dec!(25))))
        .unwrap();
    println!("  Borrower repaid 25");
    print_valuation(&engine);

    engine.repay(BORROWER, RepayAmount::Max).unwrap();
    println!("  Borrower repaid the outstanding remainder");
    println!(
        "    total borrowed {}, total repaid {}",
        engine.total_borrowed(),
        engine.total_repaid()
    );
    print_valuation(&engine);
    println!();
}

/// Incidental reward tokens recovered without touching loan accounting.
fn scenario_3_reconcile_rewards() {
    println!("Scenario 3: Reconcile Incidental Rewards\n");

    let mut engine = new_engine(dec!(1000));
    engine
        .configure_loan(MANAGER, LoanTerms::new(BORROWER, USDC, Amount::new_unchecked(dec!(300))))
        .unwrap();

    // reward tokens land in the position's custody account
    engine
        .gateway_mut()
        .mint(REWARD, CUSTODY, Amount::new_unchecked(dec!(456)));
    println!("  456 reward tokens arrived in custody");

    engine.reconcile(MANAGER, &[REWARD]).unwrap();
    let vault_rewards = engine.gateway().balance_of(REWARD, VAULT);
    println!("  Reconciled: vault now holds {} reward tokens", vault_rewards);
    print_valuation(&engine);
    println!();
}

/// Closure with an unrecovered balance: the write-off leaves valuation at zero.
fn scenario_4_close_with_write_off() {
    println!("Scenario 4: Close with Write-Off\n");

    let mut engine = new_engine(dec!(1000));
    engine
        .configure_loan(MANAGER, LoanTerms::new(BORROWER, USDC, Amount::new_unchecked(dec!(100))))
        .unwrap();

    engine.borrow(BORROWER, Amount::new_unchecked(dec!(25))).unwrap();
    println!("  Borrower drew 25 and never repaid");

    // stray native currency in custody gets wrapped and forwarded on close
    engine
        .gateway_mut()
        .mint(NATIVE, CUSTODY, Amount::new_unchecked(dec!(7)));

    engine.close_loan(MANAGER, &[]).unwrap();
    println!("  Loan closed");
    println!(
        "    write-off: {} (borrowed {} vs repaid {})",
        engine.position().outstanding(),
        engine.total_borrowed(),
        engine.total_repaid()
    );
    print_valuation(&engine);

    let vault_usdc = engine.gateway().balance_of(USDC, VAULT);
    let vault_wrapped = engine.gateway().balance_of(WNATIVE, VAULT);
    println!("    vault holds {} USDC and {} wrapped native", vault_usdc, vault_wrapped);
    println!("    events recorded: {}", engine.events().len());
}
